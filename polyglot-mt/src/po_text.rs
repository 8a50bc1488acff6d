//! Raw text of a PO file
//!
//! polib only understands headers that carry its fixed set of fields, and it
//! regenerates the whole file from its own model when writing, losing file
//! comments and any header field it does not know. `PoText` keeps the file
//! as it was read: it hands polib a copy with the missing header fields
//! filled in, and writes translations back by replacing only the `msgstr`
//! lines of the messages that changed.

use crate::error::{MtError, MtResult};
use std::ops::Range;

/// Header fields polib requires, with the value used when a file lacks one
const REQUIRED_HEADER_FIELDS: [(&str, &str); 9] = [
    ("Project-Id-Version", ""),
    ("POT-Creation-Date", ""),
    ("PO-Revision-Date", ""),
    ("Language-Team", ""),
    ("MIME-Version", "1.0"),
    ("Content-Type", "text/plain; charset=UTF-8"),
    ("Content-Transfer-Encoding", "8bit"),
    ("Language", ""),
    ("Plural-Forms", "nplurals=2; plural=(n != 1);"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Other,
    Id,
    Str,
}

/// A message block as polib would see it
#[derive(Debug, Default)]
struct Block {
    registered: bool,
    plural: bool,
    /// Escaped msgid, quoted parts joined
    msgid: String,
    /// Escaped msgstr, quoted parts joined
    msgstr: String,
    /// Bytes of the `msgstr` line and its continuation lines
    msgstr_span: Option<Range<usize>>,
    /// End of the last line of the block
    end: usize,
}

#[derive(Debug, Clone)]
struct Header {
    /// Escaped header text, quoted parts joined
    content: String,
    /// Where extra header lines go: right after the header's msgstr lines
    insert_at: usize,
}

#[derive(Debug, Clone)]
struct MsgstrSlot {
    singular: bool,
    /// Empty when the message has no msgstr line at all
    span: Range<usize>,
}

/// PO file text with the location of every message's translation
#[derive(Debug, Clone)]
pub(crate) struct PoText {
    source: String,
    header: Option<Header>,
    slots: Vec<MsgstrSlot>,
}

impl PoText {
    pub(crate) fn new(source: String) -> Self {
        let mut blocks = scan(&source).into_iter().peekable();

        let header = match blocks.peek() {
            Some(Block {
                msgid,
                msgstr,
                msgstr_span: Some(span),
                ..
            }) if msgid.is_empty() => Some(Header {
                content: msgstr.clone(),
                insert_at: span.end,
            }),
            _ => None,
        };
        if header.is_some() {
            blocks.next();
        }

        let slots = blocks
            .map(|block| MsgstrSlot {
                singular: !block.plural,
                span: block.msgstr_span.unwrap_or(block.end..block.end),
            })
            .collect();

        Self {
            source,
            header,
            slots,
        }
    }

    /// Messages after the header, in file order
    pub(crate) fn message_count(&self) -> usize {
        self.slots.len()
    }

    /// The file text with every header field polib requires present
    pub(crate) fn normalized(&self) -> String {
        let present: Vec<&str> = self
            .header
            .iter()
            .flat_map(|header| header.content.split("\\n"))
            .filter_map(|line| line.split_once(':').map(|(key, _)| key))
            .collect();
        let missing: Vec<String> = REQUIRED_HEADER_FIELDS
            .iter()
            .filter(|(key, _)| !present.contains(key))
            .map(|(key, value)| format!("\"{}: {}\\n\"\n", key, value))
            .collect();

        match &self.header {
            Some(_) if missing.is_empty() => self.source.clone(),
            Some(header) => {
                let (before, after) = self.source.split_at(header.insert_at);
                let mut text = String::with_capacity(self.source.len() + 256);
                text.push_str(before);
                if !before.is_empty() && !before.ends_with('\n') {
                    text.push('\n');
                }
                if !header.content.is_empty() && !header.content.ends_with("\\n") {
                    text.push_str("\"\\n\"\n");
                }
                missing.iter().for_each(|line| text.push_str(line));
                text.push_str(after);
                text
            }
            None => {
                let mut text = String::from("msgid \"\"\nmsgstr \"\"\n");
                missing.iter().for_each(|line| text.push_str(line));
                text.push('\n');
                text.push_str(&self.source);
                text
            }
        }
    }

    /// The original text with the msgstr of each `(message index, translation)`
    /// pair replaced; `translations` must be sorted by index
    pub(crate) fn splice(&self, translations: &[(usize, String)]) -> MtResult<String> {
        let mut text = String::with_capacity(self.source.len() + 256);
        let mut cursor = 0;

        for (index, translation) in translations {
            let slot = self
                .slots
                .get(*index)
                .filter(|slot| slot.singular)
                .ok_or_else(|| {
                    MtError::CatalogError(format!("No singular message at index {}", index))
                })?;
            let span = slot.span.clone();
            if span.start < cursor {
                return Err(MtError::CatalogError(format!(
                    "Translations out of order at index {}",
                    index
                )));
            }

            text.push_str(&self.source[cursor..span.start]);
            let original = &self.source[span.clone()];
            let (newline, ending) = if original.ends_with("\r\n") {
                ("\r\n", "\r\n")
            } else if original.is_empty() || original.ends_with('\n') {
                ("\n", "\n")
            } else {
                ("\n", "")
            };
            if original.is_empty() && !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&render_msgstr(translation, newline));
            text.push_str(ending);
            cursor = span.end;
        }

        text.push_str(&self.source[cursor..]);
        Ok(text)
    }
}

/// Split PO text into message blocks, following polib's line rules
fn scan(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut block = Block::default();
    let mut field = Field::Other;
    let mut offset = 0;

    for raw in source.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');

        if line.is_empty() {
            if block.registered {
                blocks.push(std::mem::take(&mut block));
            } else {
                block = Block::default();
            }
            field = Field::Other;
            continue;
        }
        block.end = offset;

        if line.starts_with("#. ") || line.starts_with("#: ") || line.starts_with("#, ") {
            block.registered = true;
            field = Field::Other;
        } else if line.starts_with('#') {
            // translator comments, obsolete and previous entries
        } else if line.starts_with("msgctxt ") {
            block.registered = true;
            field = Field::Other;
        } else if line.starts_with("msgid_plural ") {
            block.registered = true;
            block.plural = true;
            field = Field::Other;
        } else if let Some(rest) = line.strip_prefix("msgid ") {
            block.registered = true;
            block.msgid.push_str(unquote(rest));
            field = Field::Id;
        } else if let Some(rest) = line.strip_prefix("msgstr ") {
            block.registered = true;
            block.msgstr.push_str(unquote(rest));
            block.msgstr_span = Some(start..offset);
            field = Field::Str;
        } else if line.starts_with("msgstr[") {
            block.registered = true;
            field = Field::Other;
        } else if line.starts_with('"') {
            block.registered = true;
            match field {
                Field::Id => block.msgid.push_str(unquote(line)),
                Field::Str => {
                    block.msgstr.push_str(unquote(line));
                    if let Some(span) = block.msgstr_span.as_mut() {
                        span.end = offset;
                    }
                }
                Field::Other => {}
            }
        }
    }

    if block.registered {
        blocks.push(block);
    }
    blocks
}

fn unquote(quoted: &str) -> &str {
    quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(quoted)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `msgstr` line(s) for a translation, without the final line ending
///
/// Multi-line translations use the gettext layout: an empty first string,
/// then one quoted line per `\n`.
fn render_msgstr(translation: &str, newline: &str) -> String {
    let body = translation.strip_suffix('\n').unwrap_or(translation);
    if !body.contains('\n') {
        return format!("msgstr \"{}\"", escape(translation));
    }

    let mut rendered = String::from("msgstr \"\"");
    for line in translation.split_inclusive('\n') {
        rendered.push_str(newline);
        rendered.push('"');
        rendered.push_str(&escape(line));
        rendered.push('"');
    }
    rendered
}
