//! Control-channel reply lines.
//!
//! RFC 959 replies are `DDD message` lines: a 3-digit status code, a
//! separator, and free text. 1xx codes are intermediate — the command that
//! triggered them is still in flight and one more reply is coming.

use crate::FtpError;

/// One parsed control-channel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The 3-digit status code.
    pub status: u16,
    /// The message text after the status code.
    pub message: String,
}

impl Reply {
    /// Parse a reply line (CR/LF already stripped or not — both accepted).
    pub fn parse(line: &str) -> Result<Self, FtpError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let digits = line.as_bytes().get(..3).filter(|d| {
            d.iter().all(u8::is_ascii_digit)
        });
        let Some(digits) = digits else {
            return Err(FtpError::MalformedReply {
                line: line.to_string(),
            });
        };

        let status = digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

        // Separator is a space, or '-' for the first line of a multi-line
        // reply; printers answer in single lines but tolerate both.
        let message = line[3..]
            .strip_prefix([' ', '-'])
            .unwrap_or(&line[3..])
            .to_string();

        Ok(Reply { status, message })
    }

    /// 1xx — the command is still in flight; another reply follows.
    pub fn is_intermediate(&self) -> bool {
        (100..200).contains(&self.status)
    }

    /// 4xx/5xx — the command (or connection attempt) failed.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}
