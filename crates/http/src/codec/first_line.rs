//! First-line grammars, selected per parser through [`FirstLineKind`].

use http::{Method, StatusCode};

use crate::ensure;
use crate::protocol::{FirstLine, ParseError, RequestLine, StatusLine};

/// Chooses which grammar a [`MessageParser`](super::MessageParser) applies to the first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstLineKind {
    /// `METHOD SP PATH SP PROTOCOL`
    Request,
    /// `PROTOCOL SP 3DIGIT SP REASON`
    Status,
}

impl FirstLineKind {
    /// Parses `line` with the grammar this kind selects.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FirstLineSyntax`] when the line does not match.
    pub fn parse(self, line: &str) -> Result<FirstLine, ParseError> {
        match self {
            FirstLineKind::Request => parse_request_line(line).map(FirstLine::Request),
            FirstLineKind::Status => parse_status_line(line).map(FirstLine::Status),
        }
    }
}

/// Method and path end at the first and second space; the protocol is the rest of the line.
fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let malformed = || ParseError::first_line_syntax(line);

    let (method, rest) = line.split_once(' ').ok_or_else(malformed)?;
    let (path, protocol) = rest.split_once(' ').ok_or_else(malformed)?;
    ensure!(!method.is_empty() && !path.is_empty() && !protocol.is_empty(), malformed());

    let method = Method::from_bytes(method.as_bytes()).map_err(|_e| malformed())?;

    Ok(RequestLine::new(method, path, protocol))
}

fn parse_status_line(line: &str) -> Result<StatusLine, ParseError> {
    let malformed = || ParseError::first_line_syntax(line);

    let (protocol, rest) = line.split_once(' ').ok_or_else(malformed)?;
    let (code, reason) = rest.split_once(' ').ok_or_else(malformed)?;
    ensure!(!protocol.is_empty() && !reason.is_empty(), malformed());
    ensure!(code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()), malformed());

    let status = StatusCode::from_bytes(code.as_bytes()).map_err(|_e| malformed())?;

    Ok(StatusLine::new(protocol, status, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_line() {
        let line = FirstLineKind::Request.parse("POST /hello?a=1 HTTP/1.1").unwrap();
        let FirstLine::Request(request) = line else { panic!("expected request line") };

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/hello?a=1");
        assert_eq!(request.protocol(), "HTTP/1.1");
    }

    #[test]
    fn request_line_keeps_extension_methods_and_protocol_tail() {
        let line = FirstLineKind::Request.parse("PURGE /cache HTTP/1.1 extra").unwrap();
        let FirstLine::Request(request) = line else { panic!("expected request line") };

        assert_eq!(request.method().as_str(), "PURGE");
        assert_eq!(request.protocol(), "HTTP/1.1 extra");
    }

    #[test]
    fn malformed_request_lines() {
        for line in ["GET", "GET /", "GET  HTTP/1.1", " / HTTP/1.1", "GET / ", "G(T / HTTP/1.1", ""] {
            assert_eq!(
                FirstLineKind::Request.parse(line),
                Err(ParseError::first_line_syntax(line)),
                "line {line:?} should be rejected"
            );
        }
    }

    #[test]
    fn status_line() {
        let line = FirstLineKind::Status.parse("HTTP/1.1 404 Not Found").unwrap();
        let FirstLine::Status(status) = line else { panic!("expected status line") };

        assert_eq!(status.protocol(), "HTTP/1.1");
        assert_eq!(status.status(), StatusCode::NOT_FOUND);
        assert_eq!(status.reason(), "Not Found");
    }

    #[test]
    fn malformed_status_lines() {
        for line in ["HTTP/1.1 200", "HTTP/1.1 20 OK", "HTTP/1.1 2000 OK", "HTTP/1.1 abc OK", "HTTP/1.1 099 Low", "HTTP/1.1 200 "] {
            assert_eq!(
                FirstLineKind::Status.parse(line),
                Err(ParseError::first_line_syntax(line)),
                "line {line:?} should be rejected"
            );
        }
    }

    #[test]
    fn kinds_do_not_cross() {
        assert!(FirstLineKind::Status.parse("GET / HTTP/1.1").is_err());
        // '/' is not a token character, so a status line never passes as a method
        assert!(FirstLineKind::Request.parse("HTTP/1.1 200 OK").is_err());
    }
}
