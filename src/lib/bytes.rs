//! Stateless helpers over byte strings.
//!
//! Everything here works on raw bytes, so offsets never have to land on UTF-8
//! boundaries. ASCII classification beyond [`is_white`] is covered by the
//! `u8::is_ascii_*` methods in std.

use std::cmp::Ordering;
use std::iter::FusedIterator;

const EMPTY: &[u8] = &[];

/// Returns true for non-NUL control bytes and space (`0x01..=0x20`).
pub fn is_white(ch: u8) -> bool {
    ch != 0 && ch <= 0x20
}

/// Returns true if `s` is non-empty and all ASCII digits.
pub fn is_digits(s: &[u8]) -> bool {
    !s.is_empty() && s.iter().all(u8::is_ascii_digit)
}

/// Byte-wise comparison folding ASCII case. A proper prefix sorts first.
pub fn compare_ignore_case(a: &[u8], b: &[u8]) -> Ordering {
    a.iter()
        .map(u8::to_ascii_lowercase)
        .cmp(b.iter().map(u8::to_ascii_lowercase))
}

/// Up to `size` bytes starting at `begin`, clamped to the input.
pub fn substr(s: &[u8], begin: usize, size: usize) -> &[u8] {
    let begin = begin.min(s.len());
    let end = begin.saturating_add(size).min(s.len());
    &s[begin..end]
}

/// The last `size` bytes, or all of `s` if it is shorter.
pub fn rsubstr(s: &[u8], size: usize) -> &[u8] {
    &s[s.len() - size.min(s.len())..]
}

/// Offset of the first `ch` in `s`.
pub fn find_byte(s: &[u8], ch: u8) -> Option<usize> {
    s.iter().position(|&b| b == ch)
}

/// Offset of the last `ch` in `s`.
pub fn rfind_byte(s: &[u8], ch: u8) -> Option<usize> {
    s.iter().rposition(|&b| b == ch)
}

/// Offset of the first occurrence of `needle`. An empty needle matches at 0.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Offset of the last occurrence of `needle`. An empty needle matches at the
/// end of `haystack`.
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Maximal runs of bytes for which `is_sep` is false.
///
/// Leading, trailing and repeated separators produce no empty fields.
pub fn fields<'a, F>(s: &'a [u8], is_sep: F) -> impl Iterator<Item = &'a [u8]> + 'a
where
    F: Fn(u8) -> bool + 'a,
{
    s.split(move |&b| is_sep(b)).filter(|field| !field.is_empty())
}

/// Pieces of `s` between occurrences of `sep`, created by [`split_str`].
pub struct SplitStr<'a> {
    rest: Option<&'a [u8]>,
    sep: &'a [u8],
}

impl<'a> Iterator for SplitStr<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        if self.sep.is_empty() {
            self.rest = None;
            return Some(rest);
        }
        match find(rest, self.sep) {
            Some(at) => {
                self.rest = Some(&rest[at + self.sep.len()..]);
                Some(&rest[..at])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

impl FusedIterator for SplitStr<'_> {}

/// Splits `s` on every occurrence of `sep`, keeping empty pieces.
///
/// An empty `s` yields nothing; an empty `sep` yields `s` once.
pub fn split_str<'a>(s: &'a [u8], sep: &'a [u8]) -> SplitStr<'a> {
    SplitStr {
        rest: (!s.is_empty()).then_some(s),
        sep,
    }
}

/// Splits `name<sep>value` at the first byte matching `is_sep`.
///
/// Returns `None` for empty input and no value when there is no separator.
pub fn pair<F>(s: &[u8], is_sep: F) -> Option<(&[u8], Option<&[u8]>)>
where
    F: Fn(u8) -> bool,
{
    if s.is_empty() {
        return None;
    }
    Some(match s.iter().position(|&b| is_sep(b)) {
        Some(at) => (&s[..at], Some(&s[at + 1..])),
        None => (s, None),
    })
}

/// Splits `s` at the first occurrence of `sep` into name and value.
///
/// The value is empty when `sep` is empty or absent. Returns `None` for
/// empty input.
pub fn pair_str<'a>(s: &'a [u8], sep: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    if s.is_empty() {
        return None;
    }
    if sep.is_empty() {
        return Some((s, EMPTY));
    }
    Some(match find(s, sep) {
        Some(at) => (&s[..at], &s[at + sep.len()..]),
        None => (s, EMPTY),
    })
}

/// Strips bytes matching `is_sep` from both ends.
pub fn trim<F>(s: &[u8], is_sep: F) -> &[u8]
where
    F: Fn(u8) -> bool,
{
    let begin = s.iter().position(|&b| !is_sep(b)).unwrap_or(s.len());
    let end = s.iter().rposition(|&b| !is_sep(b)).map_or(begin, |i| i + 1);
    &s[begin..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces<'a>(it: impl Iterator<Item = &'a [u8]>) -> Vec<&'a str> {
        it.map(|p| std::str::from_utf8(p).unwrap()).collect()
    }

    #[test]
    fn test_is_white() {
        assert!(is_white(b' '));
        assert!(is_white(b'\t'));
        assert!(is_white(b'\n'));
        assert!(!is_white(0));
        assert!(!is_white(b'a'));
        assert!(!is_white(0x7f));
    }

    #[test]
    fn test_is_digits() {
        assert!(is_digits(b"0123456789"));
        assert!(!is_digits(b""));
        assert!(!is_digits(b"12a"));
        assert!(!is_digits(b"-1"));
    }

    #[test]
    fn test_compare_ignore_case() {
        assert_eq!(compare_ignore_case(b"Hello", b"hELLO"), Ordering::Equal);
        assert_eq!(compare_ignore_case(b"abc", b"ABD"), Ordering::Less);
        assert_eq!(compare_ignore_case(b"abc", b"AB"), Ordering::Greater);
        assert_eq!(compare_ignore_case(b"", b"a"), Ordering::Less);
        // only ASCII letters fold
        assert_eq!(compare_ignore_case(b"[", b"{"), Ordering::Less);
    }

    #[test]
    fn test_substr_clamps() {
        assert_eq!(substr(b"hello", 1, 3), b"ell");
        assert_eq!(substr(b"hello", 3, 100), b"lo");
        assert_eq!(substr(b"hello", 9, 2), b"");
        assert_eq!(substr(b"hello", 2, usize::MAX), b"llo");
        assert_eq!(rsubstr(b"hello", 3), b"llo");
        assert_eq!(rsubstr(b"hello", 10), b"hello");
        assert_eq!(rsubstr(b"hello", 0), b"");
    }

    #[test]
    fn test_find_bytes() {
        assert_eq!(find_byte(b"a/b/c", b'/'), Some(1));
        assert_eq!(rfind_byte(b"a/b/c", b'/'), Some(3));
        assert_eq!(find_byte(b"abc", b'/'), None);
        assert_eq!(rfind_byte(b"", b'/'), None);
    }

    #[test]
    fn test_find_substrings() {
        assert_eq!(find(b"abcabc", b"bc"), Some(1));
        assert_eq!(rfind(b"abcabc", b"bc"), Some(4));
        assert_eq!(find(b"abc", b""), Some(0));
        assert_eq!(rfind(b"abc", b""), Some(3));
        assert_eq!(find(b"ab", b"abc"), None);
        assert_eq!(rfind(b"ab", b"abc"), None);
        assert_eq!(find(b"aaa", b"aa"), Some(0));
        assert_eq!(rfind(b"aaa", b"aa"), Some(1));
    }

    #[test]
    fn test_fields_skip_empty_runs() {
        assert_eq!(
            pieces(fields(b"  alpha \t beta\ngamma  ", is_white)),
            vec!["alpha", "beta", "gamma"]
        );
        assert!(fields(b"   ", is_white).next().is_none());
        assert!(fields(b"", is_white).next().is_none());
        // stopping early is just dropping the iterator
        let first: Vec<_> = fields(b"a,b,c", |b| b == b',').take(2).collect();
        assert_eq!(first, vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn test_split_str_keeps_empty_pieces() {
        assert_eq!(pieces(split_str(b"a::b::::c", b"::")), vec!["a", "b", "", "c"]);
        assert_eq!(pieces(split_str(b"a,", b",")), vec!["a", ""]);
        assert_eq!(pieces(split_str(b"abc", b"")), vec!["abc"]);
        assert_eq!(pieces(split_str(b"abc", b"x")), vec!["abc"]);
        assert!(split_str(b"", b",").next().is_none());
    }

    #[test]
    fn test_pair() {
        let eq = |b: u8| b == b'=' || b == b':';
        assert_eq!(pair(b"name=value", eq), Some((&b"name"[..], Some(&b"value"[..]))));
        assert_eq!(pair(b"name:", eq), Some((&b"name"[..], Some(&b""[..]))));
        assert_eq!(pair(b"name", eq), Some((&b"name"[..], None)));
        assert_eq!(pair(b"", eq), None);
    }

    #[test]
    fn test_pair_str() {
        assert_eq!(pair_str(b"key => value", b" => "), Some((&b"key"[..], &b"value"[..])));
        assert_eq!(pair_str(b"key", b"=>"), Some((&b"key"[..], &b""[..])));
        assert_eq!(pair_str(b"key=v", b""), Some((&b"key=v"[..], &b""[..])));
        assert_eq!(pair_str(b"", b"="), None);
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim(b"  padded \n", is_white), b"padded");
        assert_eq!(trim(b"xxabcxx", |b| b == b'x'), b"abc");
        assert_eq!(trim(b"    ", is_white), b"");
        assert_eq!(trim(b"", is_white), b"");
        assert_eq!(trim(b"a", is_white), b"a");
    }
}
