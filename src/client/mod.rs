mod endpoint;
mod form;
mod transport;

pub use endpoint::{api_base, query_url, LOCAL_DEV_ORIGIN};
pub use form::{QueryForm, QueryView, Submission, PENDING_TEXT};
pub use transport::{HttpTransport, QueryError, QueryTransport, REQUEST_FAILED};
