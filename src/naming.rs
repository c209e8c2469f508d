// Filename suffix mapping.
//
// Compressed names get the format's canonical suffix appended. Uncompressed
// names are derived by matching a known suffix (case-insensitive, longest
// first), e.g. `backup.tbz2 -> backup.tar`, `notes.txt.bz2 -> notes.txt`.

use crate::engine::Format;

/// `(suffix, replacement)` pairs, longest suffix first.
const BZIP2_SUFFIXES: &[(&str, &str)] = &[
    (".tar.bz2", ".tar"),
    (".tbz2", ".tar"),
    (".tbz", ".tar"),
    (".bz2", ""),
    (".bz", ""),
];

const ZLIB_SUFFIXES: &[(&str, &str)] = &[(".zz", "")];

/// Appended to a name that carries no recognizable suffix.
const FALLBACK_SUFFIX: &str = ".out";

fn suffixes(format: Format) -> &'static [(&'static str, &'static str)] {
    match format {
        Format::Bzip2 => BZIP2_SUFFIXES,
        Format::Zlib => ZLIB_SUFFIXES,
    }
}

/// Canonical suffix written by `compressed_name`.
pub fn canonical_suffix(format: Format) -> &'static str {
    match format {
        Format::Bzip2 => ".bz2",
        Format::Zlib => ".zz",
    }
}

/// Length of the stem if `name` ends with `suffix` (ASCII case-insensitive)
/// and something is left in front of it.
fn strip_suffix_len(name: &str, suffix: &str) -> Option<usize> {
    let stem = name.len().checked_sub(suffix.len())?;
    if stem == 0 || !name.is_char_boundary(stem) {
        return None;
    }
    name[stem..].eq_ignore_ascii_case(suffix).then_some(stem)
}

/// Name of the file produced by compressing `name`.
pub fn compressed_name(name: &str, format: Format) -> String {
    format!("{name}{}", canonical_suffix(format))
}

/// Name of the file produced by decompressing `name`.
pub fn uncompressed_name(name: &str, format: Format) -> String {
    for (suffix, replacement) in suffixes(format) {
        if let Some(stem) = strip_suffix_len(name, suffix) {
            return format!("{}{replacement}", &name[..stem]);
        }
    }
    let stripped = name.replace(canonical_suffix(format), "");
    if stripped.is_empty() || stripped == name {
        format!("{name}{FALLBACK_SUFFIX}")
    } else {
        stripped
    }
}

/// Format implied by a file name's suffix, if any.
pub fn format_of(name: &str) -> Option<Format> {
    [Format::Bzip2, Format::Zlib].into_iter().find(|&format| {
        suffixes(format)
            .iter()
            .any(|(suffix, _)| strip_suffix_len(name, suffix).is_some())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_names() {
        assert_eq!(compressed_name("data.tar", Format::Bzip2), "data.tar.bz2");
        assert_eq!(compressed_name("log", Format::Zlib), "log.zz");
    }

    #[test]
    fn bzip2_suffix_table() {
        let cases = [
            ("a.tar.bz2", "a.tar"),
            ("a.tbz2", "a.tar"),
            ("a.tbz", "a.tar"),
            ("notes.txt.bz2", "notes.txt"),
            ("notes.bz", "notes"),
            ("SHOUT.TBZ2", "SHOUT.tar"),
            ("Mixed.Bz2", "Mixed"),
        ];
        for (input, expected) in cases {
            assert_eq!(uncompressed_name(input, Format::Bzip2), expected, "{input}");
        }
    }

    #[test]
    fn fallback_removes_embedded_suffix() {
        assert_eq!(
            uncompressed_name("dump.bz2.part", Format::Bzip2),
            "dump.part"
        );
        assert_eq!(uncompressed_name("x.zz.tmp", Format::Zlib), "x.tmp");
    }

    #[test]
    fn fallback_removes_every_embedded_suffix() {
        assert_eq!(
            uncompressed_name("a.bz2.b.bz2.part", Format::Bzip2),
            "a.b.part"
        );
        assert_eq!(uncompressed_name("x.zz.zz.tmp", Format::Zlib), "x.tmp");
    }

    #[test]
    fn unknown_names_get_out_suffix() {
        assert_eq!(uncompressed_name("plain", Format::Bzip2), "plain.out");
        assert_eq!(uncompressed_name(".bz2", Format::Bzip2), ".bz2.out");
        assert_eq!(uncompressed_name("data.bz2", Format::Zlib), "data.bz2.out");
    }

    #[test]
    fn zlib_suffix() {
        assert_eq!(uncompressed_name("trace.json.zz", Format::Zlib), "trace.json");
    }

    #[test]
    fn detection() {
        assert_eq!(format_of("x.TAR.BZ2"), Some(Format::Bzip2));
        assert_eq!(format_of("x.tbz"), Some(Format::Bzip2));
        assert_eq!(format_of("x.zz"), Some(Format::Zlib));
        assert_eq!(format_of("x.gz"), None);
        assert_eq!(format_of(".zz"), None);
        assert_eq!(format_of("\u{e9}.bz2"), Some(Format::Bzip2));
    }
}
