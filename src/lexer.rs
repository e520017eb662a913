/// Random-access cursor over the characters of a source string.
///
/// Matchers speculatively advance the cursor; a snapshot taken before the
/// attempt lets them put it back untouched when the attempt fails.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<(usize, char)>,
    source_len: usize,
    index: usize,
    snapshots: Vec<usize>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.char_indices().collect(),
            source_len: source.len(),
            index: 0,
            snapshots: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<char> {
        self.peek(0)
    }

    /// Character `distance` positions past the cursor.
    pub fn peek(&self, distance: usize) -> Option<char> {
        self.chars.get(self.index + distance).map(|(_, ch)| *ch)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.index += 1;
        Some(ch)
    }

    pub fn advance_while<F: Fn(char) -> bool>(&mut self, check: F) -> usize {
        let start = self.index;
        while matches!(self.current(), Some(ch) if check(ch)) {
            self.index += 1;
        }
        self.index - start
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// Byte offset of the cursor, or the source length once exhausted.
    pub fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source_len)
    }

    pub fn take_snapshot(&mut self) {
        self.snapshots.push(self.index);
    }

    pub fn rollback_snapshot(&mut self) {
        if let Some(index) = self.snapshots.pop() {
            self.index = index;
        }
    }

    pub fn commit_snapshot(&mut self) {
        self.snapshots.pop();
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use pretty_assertions::assert_eq;

    #[test]
    fn rollback_restores_cursor() {
        let mut lexer = Lexer::new("abc");
        lexer.advance();
        lexer.take_snapshot();
        lexer.advance();
        lexer.advance();
        assert!(lexer.is_at_end());
        lexer.rollback_snapshot();
        assert_eq!(lexer.current(), Some('b'));
        assert_eq!(lexer.offset(), 1);
    }

    #[test]
    fn commit_keeps_cursor() {
        let mut lexer = Lexer::new("héllo");
        lexer.take_snapshot();
        lexer.advance_while(|ch| ch != 'l');
        lexer.commit_snapshot();
        assert_eq!(lexer.current(), Some('l'));
        assert_eq!(lexer.offset(), 3);
        assert_eq!(lexer.peek(2), Some('o'));
        assert_eq!(lexer.peek(3), None);
    }
}
