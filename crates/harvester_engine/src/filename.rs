/// Workbook file name for a listing: every character outside `[A-Za-z0-9]`
/// becomes `_`, the result is lowercased and gets an `.xlsx` extension.
///
/// `https://www.infocasas.com.bo/alquiler` -> `https___www_infocasas_com_bo_alquiler.xlsx`
pub fn workbook_filename(listing_url: &str) -> String {
    let mut stem: String = listing_url
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        stem = "listing".to_string();
    }
    format!("{stem}.xlsx")
}
