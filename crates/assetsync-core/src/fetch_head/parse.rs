//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult. Unknown headers are ignored.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    result.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-md5") && !value.is_empty() {
                result.content_md5 = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("etag") && !value.is_empty() {
                result.etag = Some(value.trim_matches('"').to_string());
            }
        }
    }

    result
}
