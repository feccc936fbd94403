use harvester_core::{AddOutcome, Frontier, RejectReason};
use pretty_assertions::assert_eq;

fn drained(frontier: &mut Frontier) -> Vec<String> {
    frontier.drain().into_iter().map(|u| u.into_string()).collect()
}

#[test]
fn keeps_each_url_once_in_first_seen_order() {
    let mut frontier = Frontier::new();
    for url in [
        "https://example.com/b",
        "https://example.com/a",
        "https://example.com/b",
        "https://example.com/c",
        "https://example.com/a",
    ] {
        frontier.add(url);
    }

    assert_eq!(frontier.size(), 3);
    assert_eq!(
        drained(&mut frontier),
        vec![
            "https://example.com/b",
            "https://example.com/a",
            "https://example.com/c",
        ]
    );
}

#[test]
fn query_strings_make_urls_distinct() {
    let mut frontier = Frontier::new();
    assert_eq!(frontier.add("https://example.com/i/1?a=1&b=2"), AddOutcome::Inserted);
    assert_eq!(frontier.add("https://example.com/i/1?b=2&a=1"), AddOutcome::Inserted);
    assert_eq!(frontier.add("https://example.com/i/1/"), AddOutcome::Inserted);
    assert_eq!(frontier.add("https://example.com/i/1"), AddOutcome::Inserted);
    assert_eq!(frontier.size(), 4);
}

#[test]
fn ip_hosts_never_reach_the_drained_output() {
    let mut frontier = Frontier::new();
    assert_eq!(
        frontier.add("http://34.120.7.8/inmueble/1"),
        AddOutcome::Rejected(RejectReason::IpHost)
    );
    assert_eq!(frontier.add("https://example.com/i/1"), AddOutcome::Inserted);
    assert_eq!(
        frontier.add("https://34.120.7.8:443/inmueble/1"),
        AddOutcome::Rejected(RejectReason::IpHost)
    );

    let urls = drained(&mut frontier);
    assert_eq!(urls, vec!["https://example.com/i/1"]);
}

#[test]
fn drained_urls_still_count_as_seen() {
    let mut frontier = Frontier::new();
    frontier.add("https://example.com/i/1");
    assert_eq!(drained(&mut frontier).len(), 1);
    assert!(frontier.is_empty());

    assert_eq!(frontier.add("https://example.com/i/1"), AddOutcome::Duplicate);
    assert!(frontier.drain().is_empty());
}

#[test]
fn junk_is_rejected_as_invalid() {
    let mut frontier = Frontier::new();
    assert_eq!(
        frontier.add("javascript:void(0)"),
        AddOutcome::Rejected(RejectReason::Invalid)
    );
    assert_eq!(
        frontier.add("inmueble/1"),
        AddOutcome::Rejected(RejectReason::Invalid)
    );
    assert_eq!(frontier.size(), 0);
}
