//! Status echo handlers: `/json/{code}` and `/plain/{code}`.
//!
//! Both parse `{code}` as a signed base-10 integer and answer with exactly
//! that status plus two headers:
//!
//! ```text
//! Content-Type: application/json; charset=utf-8   (or text/plain)
//! X-Content-Type-Options: nosniff
//! ```
//!
//! | Route | 204 | any other code |
//! |---|---|---|
//! | `/json/{code}` | no body | `{}` |
//! | `/plain/{code}` | no body | no body |
//!
//! Plain text never carries a body; that asymmetry is kept on purpose.
//!
//! Input that is not an integer, or an integer outside 100..=999, is a
//! [`Fault`] and ends up as a `500` via the recovery layer, not a `4xx`.

use http::StatusCode;
use http::header::X_CONTENT_TYPE_OPTIONS;

use crate::error::{Cause, Fault, ParseReason};
use crate::request::Request;
use crate::response::{ContentType, Response};

/// `GET /json/{code}`
pub async fn json(req: Request) -> Result<Response, Fault> {
    let code = parse_code(req.param("code"))?;
    Ok(echo(code, ContentType::Json, "{}"))
}

/// `GET /plain/{code}`
pub async fn plain(req: Request) -> Result<Response, Fault> {
    let code = parse_code(req.param("code"))?;
    Ok(echo(code, ContentType::Text, ""))
}

fn echo(code: StatusCode, content_type: ContentType, body: &'static str) -> Response {
    let builder = Response::builder()
        .status(code)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff");

    if code == StatusCode::NO_CONTENT {
        builder.empty(content_type)
    } else {
        builder.bytes(content_type, body)
    }
}

/// Parses a path segment into a status code.
///
/// A leading `+` or `-` is accepted by the integer parse; the value must
/// then be a valid HTTP status (three digits, 100..=999).
pub(crate) fn parse_code(raw: Option<&str>) -> Result<StatusCode, Fault> {
    let raw = raw.ok_or_else(|| parse_fault("", ParseReason::Missing))?;
    let value: i64 = raw.parse().map_err(|e| parse_fault(raw, ParseReason::from(e)))?;

    u16::try_from(value)
        .ok()
        .and_then(|v| StatusCode::from_u16(v).ok())
        .ok_or_else(|| parse_fault(raw, ParseReason::OutOfRange(value)))
}

fn parse_fault(input: &str, reason: ParseReason) -> Fault {
    Fault::from(Cause::Parse { input: input.to_owned(), reason })
}
