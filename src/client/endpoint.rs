use crate::api::QUERY_PATH;

pub const LOCAL_DEV_ORIGIN: &str = "http://localhost:8000";

pub fn api_base(page_origin: &str) -> &'static str {
    if page_origin.starts_with("file:") {
        LOCAL_DEV_ORIGIN
    } else {
        ""
    }
}

pub fn query_url(page_origin: &str) -> String {
    match api_base(page_origin) {
        "" => format!("{}{QUERY_PATH}", page_origin.trim_end_matches('/')),
        base => format!("{base}{QUERY_PATH}"),
    }
}
