//! Token scanner for annotation blocks.
//!
//! Takes the raw interior lines of one annotation block and produces a
//! flat token stream: section headers, request tokens, value lines, and
//! key/value lines. Classification is positional: a line at zero
//! indentation is a header, an indented line continues the current
//! section. This matches how course authors lay the blocks out.
//!
//! An unrecognized line at header position is reported as
//! `MalformedHeader`, never dropped: a typo there would otherwise
//! silently disable a restriction.

use coursekit_kernel::{Category, CourseError, RequestToken};

/// The recognized section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHeader {
    Tools(Category),
    PrettyName,
    Description,
    ExpectedVarsNumber,
    /// Pretty title for the namespace being opened.
    Section,
}

impl SectionHeader {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PrettyName" => Some(Self::PrettyName),
            "Description" => Some(Self::Description),
            "ExpectedVarsNumber" => Some(Self::ExpectedVarsNumber),
            "Section" => Some(Self::Section),
            other => Category::from_header(other).map(Self::Tools),
        }
    }
}

/// One scanned token, tagged with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanToken {
    Header { header: SectionHeader, line: usize },
    /// One entry of a tool-section line.
    Request { token: RequestToken, line: usize },
    /// Free-text continuation of PrettyName/Description/Section.
    Value { text: String, line: usize },
    /// Raw `name=integer` line of ExpectedVarsNumber.
    KeyValue { text: String, line: usize },
}

/// Scan the interior lines of one annotation block.
///
/// `lines` pairs each raw line with its 1-based line number in the course
/// file. Blank lines and indented lines outside any recognized section
/// are ignored.
pub fn scan_block(lines: &[(usize, String)]) -> (Vec<ScanToken>, Vec<(usize, CourseError)>) {
    let mut tokens = Vec::new();
    let mut issues = Vec::new();
    let mut current: Option<SectionHeader> = None;

    for (line_no, raw) in lines {
        let trimmed = raw.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }
        if indentation(trimmed) == 0 {
            // Header position. An inline value may follow a colon.
            let (name, inline) = match trimmed.split_once(':') {
                Some((name, rest)) => (name.trim(), Some(rest)),
                None => (trimmed.trim(), None),
            };
            match SectionHeader::from_name(name) {
                Some(header) => {
                    tracing::debug!(line = line_no, ?header, "section header");
                    tokens.push(ScanToken::Header {
                        header,
                        line: *line_no,
                    });
                    current = Some(header);
                    if let Some(inline) = inline
                        && !inline.trim().is_empty()
                    {
                        scan_content(header, inline, *line_no, &mut tokens);
                    }
                }
                None => {
                    issues.push((
                        *line_no,
                        CourseError::MalformedHeader {
                            header: name.to_string(),
                        },
                    ));
                    current = None;
                }
            }
        } else if let Some(header) = current {
            scan_content(header, trimmed, *line_no, &mut tokens);
        }
    }
    (tokens, issues)
}

fn scan_content(header: SectionHeader, text: &str, line: usize, tokens: &mut Vec<ScanToken>) {
    match header {
        SectionHeader::Tools(_) => {
            for piece in text.split(',') {
                for word in piece.split_whitespace() {
                    tokens.push(ScanToken::Request {
                        token: request_token(word),
                        line,
                    });
                }
            }
        }
        SectionHeader::PrettyName | SectionHeader::Description | SectionHeader::Section => {
            tokens.push(ScanToken::Value {
                text: text.trim().to_string(),
                line,
            });
        }
        SectionHeader::ExpectedVarsNumber => {
            tokens.push(ScanToken::KeyValue {
                text: text.trim().to_string(),
                line,
            });
        }
    }
}

fn request_token(word: &str) -> RequestToken {
    match word {
        "$ALL" => RequestToken::Wildcard,
        "$UNTIL_NOW" => RequestToken::UpToHere,
        _ => match word.strip_prefix('-') {
            Some(name) => RequestToken::Exclude(name.to_string()),
            None => RequestToken::Include(word.to_string()),
        },
    }
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
