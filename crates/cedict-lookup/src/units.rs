use cedict_types::char_units;

/// Translates unit offsets (UTF-16 model) into byte offsets of a raw source.
///
/// Unlike the builder, this works on the text exactly as the reader holds
/// it, so a `\r` before a line feed counts as its own unit.
pub struct UnitMap<'a> {
    text: &'a str,
    /// `(unit, byte)` position of every line start.
    line_starts: Vec<(u64, usize)>,
}

impl<'a> UnitMap<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![(0, 0)];
        let mut units = 0u64;
        for (idx, c) in text.char_indices() {
            units += char_units(c);
            if c == '\n' {
                line_starts.push((units, idx + 1));
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset for `unit`, or `None` past the end or inside a surrogate pair.
    pub fn byte_offset(&self, unit: u64) -> Option<usize> {
        let slot = self
            .line_starts
            .partition_point(|(u, _)| *u <= unit)
            .checked_sub(1)?;
        let (mut at_unit, mut at_byte) = self.line_starts[slot];
        for c in self.text[at_byte..].chars() {
            if at_unit >= unit {
                break;
            }
            at_unit += char_units(c);
            at_byte += c.len_utf8();
        }
        (at_unit == unit).then_some(at_byte)
    }

    /// Text from `unit` to the end of its line, without the terminator.
    pub fn line_at(&self, unit: u64) -> Option<&'a str> {
        let start = self.byte_offset(unit)?;
        if start >= self.text.len() {
            return None;
        }
        let rest = &self.text[start..];
        let line = rest.split('\n').next().unwrap_or(rest);
        Some(line.trim_end_matches('\r'))
    }
}
