use std::collections::BTreeMap;

use tracing::trace;

use crate::error::HeaderError;

/// The platform seam for outbound headers: an ordered list of raw
/// `"Name: Value"` lines queued for the response, with a one-way sent
/// boundary after which mutation must be refused.
pub trait HeaderSink {
    /// A snapshot of the queued raw lines, in queue order.
    fn lines(&self) -> Vec<String>;

    /// Queues `name: value`, replacing any queued header with the same name
    /// (compared case-insensitively).
    fn write(&mut self, name: &str, value: &str);

    /// Drops every queued header with the given name.
    fn discard(&mut self, name: &str);

    /// Whether the headers have been flushed to the client. Once true, no
    /// header can be added, removed or modified.
    fn sent(&self) -> bool;
}

/// The header name of a raw line, if it has one.
fn line_name(line: &str) -> Option<&str> {
    line.split_once(':').map(|(name, _)| name.trim())
}

/// An in-memory [`HeaderSink`].
#[derive(Debug, Clone, Default)]
pub struct HeaderBuffer {
    lines: Vec<String>,
    sent: bool,
}

impl HeaderBuffer {
    pub fn new() -> Self {
        HeaderBuffer::default()
    }

    /// Queues a raw line verbatim, without the replace-by-name behavior of
    /// [`HeaderSink::write`]. Lets tests and adapters reproduce whatever the
    /// platform already queued, malformed lines included.
    pub fn push_raw(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Crosses the sent boundary. There is no way back.
    pub fn mark_sent(&mut self) {
        self.sent = true;
    }
}

impl HeaderSink for HeaderBuffer {
    fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn write(&mut self, name: &str, value: &str) {
        self.discard(name);
        self.lines.push(format!("{name}: {value}"));
    }

    fn discard(&mut self, name: &str) {
        self.lines
            .retain(|line| !line_name(line).is_some_and(|n| n.eq_ignore_ascii_case(name)));
    }

    fn sent(&self) -> bool {
        self.sent
    }
}

/// Read/write helpers over any [`HeaderSink`].
///
/// Reads re-scan the sink on every call instead of caching: the queued set
/// can change between calls, including after it was sent. Mutations check
/// the sent boundary first. Header names compare case-insensitively
/// throughout.
pub trait ResponseHeaderUtils: HeaderSink {
    /// Parses the queued lines in order, calling `visitor` with each name
    /// and value. Lines with no colon, an empty name or an empty value are
    /// skipped without erroring. The visitor returns `false` to halt;
    /// returns whether any call halted.
    fn parse_all<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(&str, &str) -> bool,
    {
        for line in self.lines() {
            let Some((name, value)) = line.split_once(':') else {
                trace!(line = %line, "skipping header line with no colon");
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                trace!(line = %line, "skipping header line with empty name");
                continue;
            }
            if value.is_empty() {
                trace!(line = %line, "skipping header line with empty value");
                continue;
            }
            if !visitor(name, value) {
                return true;
            }
        }
        false
    }

    /// All parsable queued headers. A name queued twice keeps the later
    /// value.
    fn all(&self) -> BTreeMap<String, String> {
        let mut ret = BTreeMap::new();
        self.parse_all(|name, value| {
            ret.insert(name.to_owned(), value.to_owned());
            true
        });
        ret
    }

    /// Whether a header with the given name is queued.
    fn has(&self, name: &str) -> bool {
        self.parse_all(|n, _| !n.eq_ignore_ascii_case(name))
    }

    /// The value of the first queued header with the given name.
    fn opt(&self, name: &str) -> Option<String> {
        let mut ret = None;
        self.parse_all(|n, value| {
            if n.eq_ignore_ascii_case(name) {
                ret = Some(value.to_owned());
                false
            } else {
                true
            }
        });
        ret
    }

    /// Like [`ResponseHeaderUtils::opt`], but absence is a caller error.
    fn get(&self, name: &str) -> Result<String, HeaderError> {
        self.opt(name)
            .ok_or_else(|| HeaderError::NotFound(name.to_owned()))
    }

    /// Queues the header, overwriting any queued value for the same name.
    fn put(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.check_sent()?;
        self.write(name, value);
        Ok(())
    }

    /// Removes the header.
    fn remove(&mut self, name: &str) -> Result<(), HeaderError> {
        self.check_sent()?;
        self.discard(name);
        Ok(())
    }

    /// Concatenates `value` to the queued value, separated by `glue`, or
    /// sets it directly if the header is absent.
    fn concat(&mut self, name: &str, value: &str, glue: &str) -> Result<(), HeaderError> {
        let combined = match self.opt(name) {
            Some(existing) => existing + glue + value,
            None => value.to_owned(),
        };
        self.put(name, &combined)
    }

    /// Like [`ResponseHeaderUtils::opt`], parsing the value as a comma
    /// separated list. Embedded commas are not escaped.
    fn opt_csv(&self, name: &str) -> Option<Vec<String>> {
        self.opt(name)
            .map(|value| value.split(',').map(str::to_owned).collect())
    }

    /// Like [`ResponseHeaderUtils::get`], parsing the value as a comma
    /// separated list.
    fn get_csv(&self, name: &str) -> Result<Vec<String>, HeaderError> {
        self.opt_csv(name)
            .ok_or_else(|| HeaderError::NotFound(name.to_owned()))
    }

    /// Appends the values, comma-joined, to the queued list. Does nothing
    /// when given no values.
    fn add_csv(&mut self, name: &str, values: &[&str]) -> Result<(), HeaderError> {
        self.check_sent()?;
        if !values.is_empty() {
            self.concat(name, &values.join(","), ",")?;
        }
        Ok(())
    }

    /// Replaces the header with the values comma-joined. Given no values,
    /// removes the header entirely.
    fn put_csv(&mut self, name: &str, values: &[&str]) -> Result<(), HeaderError> {
        if values.is_empty() {
            self.remove(name)
        } else {
            self.put(name, &values.join(","))
        }
    }

    /// Removes the given values from the queued comma separated list,
    /// comparing exactly or ASCII-case-insensitively, and rewrites the
    /// header with the survivors (removing it when none survive). Returns
    /// the removed entries keyed by their original list position.
    fn remove_csv(
        &mut self,
        name: &str,
        case_sensitive: bool,
        values: &[&str],
    ) -> Result<BTreeMap<usize, String>, HeaderError> {
        self.check_sent()?;
        let mut removed = BTreeMap::new();
        if let Some(list) = self.opt_csv(name) {
            let mut survivors = Vec::new();
            for (position, entry) in list.into_iter().enumerate() {
                let matches = values.iter().any(|needle| {
                    if case_sensitive {
                        entry == *needle
                    } else {
                        entry.eq_ignore_ascii_case(needle)
                    }
                });
                if matches {
                    removed.insert(position, entry);
                } else {
                    survivors.push(entry);
                }
            }
            let survivors: Vec<&str> = survivors.iter().map(String::as_str).collect();
            self.put_csv(name, &survivors)?;
        }
        Ok(removed)
    }

    /// The sent boundary as an error.
    fn check_sent(&self) -> Result<(), HeaderError> {
        if self.sent() {
            Err(HeaderError::AlreadySent)
        } else {
            Ok(())
        }
    }
}

impl<T: HeaderSink + ?Sized> ResponseHeaderUtils for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn put_overwrites() {
        let mut buf = HeaderBuffer::new();
        assert_eq!(buf.all(), BTreeMap::new());

        buf.push_raw("Content-Type: json");
        buf.put("Content-Type", "application/json").unwrap();
        assert_eq!(
            buf.all(),
            headers_of(&[("Content-Type", "application/json")])
        );

        buf.put("Content-Encoding", "gzip").unwrap();
        assert_eq!(
            buf.all(),
            headers_of(&[
                ("Content-Type", "application/json"),
                ("Content-Encoding", "gzip"),
            ])
        );

        buf.put("Content-Type", "application/xml").unwrap();
        assert_eq!(
            buf.all(),
            headers_of(&[
                ("Content-Type", "application/xml"),
                ("Content-Encoding", "gzip"),
            ])
        );
    }

    #[test]
    fn get_and_opt() {
        let mut buf = HeaderBuffer::new();
        buf.put("Content-Type", "application/json").unwrap();

        assert_eq!(buf.get("Content-Type").unwrap(), "application/json");
        assert_eq!(buf.opt("content-TYPE"), Some("application/json".to_owned()));
        assert_eq!(buf.opt("Content-Encoding"), None);
        assert_eq!(
            buf.opt("Content-Encoding").unwrap_or_else(|| "none".into()),
            "none"
        );
        assert_eq!(
            buf.get("Content-Encoding"),
            Err(HeaderError::NotFound("Content-Encoding".to_owned()))
        );
    }

    #[test]
    fn remove() {
        let mut buf = HeaderBuffer::new();
        buf.put("Content-Type", "application/json").unwrap();
        buf.put("Content-Encoding", "gzip").unwrap();

        buf.remove("Content-Encoding").unwrap();
        assert_eq!(
            buf.all(),
            headers_of(&[("Content-Type", "application/json")])
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut buf = HeaderBuffer::new();
        buf.push_raw("no colon here");
        buf.push_raw(": empty name");
        buf.push_raw("Empty-Value:   ");
        buf.push_raw("X-Ok: fine");
        assert_eq!(buf.all(), headers_of(&[("X-Ok", "fine")]));
    }

    #[test]
    fn duplicate_names_keep_later_value() {
        let mut buf = HeaderBuffer::new();
        buf.push_raw("X-Dup: first");
        buf.push_raw("X-Dup: second");
        assert_eq!(buf.all(), headers_of(&[("X-Dup", "second")]));
        // Single-match lookup halts at the first, like the iteration order.
        assert_eq!(buf.opt("X-Dup"), Some("first".to_owned()));
    }

    #[test]
    fn concat() {
        let mut buf = HeaderBuffer::new();
        buf.concat("X-Hello", "hello", "").unwrap();
        buf.concat("X-Hello", "world", "").unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "helloworld");

        buf.concat("X-Hello", "ciaomondo", ",").unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "helloworld,ciaomondo");
    }

    #[test]
    fn csv_add_put_opt_get() {
        let mut buf = HeaderBuffer::new();

        buf.add_csv("X-Hello", &["hello"]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "hello");
        buf.add_csv("X-Hello", &["world"]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "hello,world");
        buf.add_csv("X-Hello", &["ciao", "mondo"]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "hello,world,ciao,mondo");
        buf.add_csv("X-Hello", &[]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "hello,world,ciao,mondo");

        buf.put_csv("X-Hello", &["hello"]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "hello");
        buf.put_csv("X-Hello", &["ciao", "mondo"]).unwrap();
        assert_eq!(buf.get("X-Hello").unwrap(), "ciao,mondo");

        assert_eq!(buf.opt_csv("X-Hello"), Some(vec!["ciao".to_owned(), "mondo".to_owned()]));
        assert_eq!(buf.opt_csv("X-Ciao"), None);
        assert_eq!(
            buf.get_csv("X-Ciao"),
            Err(HeaderError::NotFound("X-Ciao".to_owned()))
        );

        // Zero values removes the header entirely.
        buf.put_csv("X-Hello", &[]).unwrap();
        assert!(!buf.has("X-Hello"));
    }

    #[test]
    fn csv_remove() {
        let mut buf = HeaderBuffer::new();
        buf.put_csv("X-Hello", &["hello", "world", "ciao", "mondo"])
            .unwrap();

        let removed = buf
            .remove_csv("X-Hello", true, &["ciao", "mondo", "hola"])
            .unwrap();
        assert_eq!(
            removed,
            BTreeMap::from([(2, "ciao".to_owned()), (3, "mondo".to_owned())])
        );
        assert_eq!(
            buf.get_csv("X-Hello").unwrap(),
            vec!["hello".to_owned(), "world".to_owned()]
        );
    }

    #[test]
    fn csv_remove_case_sensitivity() {
        let mut buf = HeaderBuffer::new();
        buf.put_csv("H", &["a", "b", "A"]).unwrap();
        let removed = buf.remove_csv("H", true, &["a"]).unwrap();
        assert_eq!(removed, BTreeMap::from([(0, "a".to_owned())]));
        assert_eq!(buf.get_csv("H").unwrap(), vec!["b".to_owned(), "A".to_owned()]);

        let mut buf = HeaderBuffer::new();
        buf.put_csv("H", &["a", "b", "A"]).unwrap();
        let removed = buf.remove_csv("H", false, &["a"]).unwrap();
        assert_eq!(
            removed,
            BTreeMap::from([(0, "a".to_owned()), (2, "A".to_owned())])
        );
        assert_eq!(buf.get_csv("H").unwrap(), vec!["b".to_owned()]);
    }

    #[test]
    fn csv_remove_everything_drops_header() {
        let mut buf = HeaderBuffer::new();
        buf.put_csv("H", &["a", "b"]).unwrap();
        buf.remove_csv("H", true, &["a", "b"]).unwrap();
        assert!(!buf.has("H"));
    }

    #[test]
    fn sent_boundary() {
        let mut buf = HeaderBuffer::new();
        buf.put("Content-Type", "text/plain").unwrap();
        buf.mark_sent();

        assert_eq!(buf.put("X-Late", "nope"), Err(HeaderError::AlreadySent));
        assert_eq!(buf.remove("Content-Type"), Err(HeaderError::AlreadySent));
        assert_eq!(buf.concat("Content-Type", "x", ""), Err(HeaderError::AlreadySent));
        assert_eq!(buf.add_csv("H", &["a"]), Err(HeaderError::AlreadySent));
        assert_eq!(buf.put_csv("H", &["a"]), Err(HeaderError::AlreadySent));
        assert_eq!(buf.put_csv("H", &[]), Err(HeaderError::AlreadySent));
        assert_eq!(
            buf.remove_csv("Content-Type", true, &["text/plain"]),
            Err(HeaderError::AlreadySent)
        );

        // Read-only access remains valid past the boundary.
        assert_eq!(buf.get("Content-Type").unwrap(), "text/plain");
        assert_eq!(buf.all(), headers_of(&[("Content-Type", "text/plain")]));
        assert!(buf.has("Content-Type"));
    }
}
