use offie_core::Shop;
use reqwest::Url;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Link that opens `shop` in Google Maps.
#[must_use]
pub fn maps_url(shop: &Shop) -> String {
    let Ok(mut url) = Url::parse(MAPS_SEARCH_URL) else {
        return MAPS_SEARCH_URL.to_owned();
    };
    url.query_pairs_mut()
        .append_pair("api", "1")
        .append_pair("query", &shop.name)
        .append_pair("query_place_id", &shop.place_id);
    url.into()
}
