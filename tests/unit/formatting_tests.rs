/*!
 * Tests for control code extraction and restoration
 */

use questlate::translation::formatting::{placeholder, CodeExtractor, PlaceholderReport};

/// Restoring an untouched extraction gives back the source text
#[test]
fn test_restore_withUntranslatedText_shouldReproduceSource() {
    let extractor = CodeExtractor::default();
    let sources = [
        "A &4B",
        "&6&lGolden &rApple &7(rare)",
        "No codes here",
        "Trailing code&r",
        "Salt & pepper &c& more",
    ];

    for source in sources {
        let extracted = extractor.extract(source);
        let restored = CodeExtractor::restore(&extracted.cleaned, &extracted.codes);
        assert_eq!(restored, source, "round trip changed {:?}", source);
    }
}

/// Codes follow their placeholders when the model reorders them
#[test]
fn test_restore_withReorderedPlaceholders_shouldFollowOrdinals() {
    let extracted = CodeExtractor::default().extract("&aGreen &cRed");
    assert_eq!(extracted.cleaned, "<<<1>>>Green <<<2>>>Red");

    let restored = CodeExtractor::restore("<<<2>>>Rot <<<1>>>Grün", &extracted.codes);
    assert_eq!(restored, "&cRot &aGrün");
}

/// A dropped placeholder loses its code and leaves nothing behind
#[test]
fn test_restore_withDroppedPlaceholder_shouldSkipItsCode() {
    let extracted = CodeExtractor::default().extract("&4A &eB &rC");
    let restored = CodeExtractor::restore("<<<1>>>a b <<<3>>>c", &extracted.codes);
    assert_eq!(restored, "&4a b &rc");
}

/// Only the first copy of a duplicated placeholder is restored
#[test]
fn test_restore_withDuplicatedPlaceholder_shouldLeaveLaterCopy() {
    let extracted = CodeExtractor::default().extract("&lBold");
    let restored = CodeExtractor::restore("<<<1>>>Fett <<<1>>>", &extracted.codes);
    assert_eq!(restored, "&lFett <<<1>>>");
}

/// Numbering restarts for every extraction
#[test]
fn test_extract_withSeparateCalls_shouldRestartNumbering() {
    let extractor = CodeExtractor::default();
    let first = extractor.extract("&1one &2two");
    let second = extractor.extract("&3three");

    assert_eq!(first.cleaned, "<<<1>>>one <<<2>>>two");
    assert_eq!(second.cleaned, "<<<1>>>three");
}

/// Placeholder text is built from the shared delimiters
#[test]
fn test_placeholder_withIndex_shouldUseTripleAngleBrackets() {
    assert_eq!(placeholder(1), "<<<1>>>");
    assert_eq!(placeholder(12), "<<<12>>>");
}

/// Reports on clean translations describe the count
#[test]
fn test_check_placeholders_withCleanText_shouldReportIntact() {
    let report = CodeExtractor::check_placeholders("<<<1>>>Привет<<<2>>>", 2);
    assert_eq!(
        report,
        PlaceholderReport {
            expected: 2,
            ..Default::default()
        }
    );
    assert_eq!(report.to_string(), "all 2 placeholders intact");
}

/// An invalid pattern is rejected up front
#[test]
fn test_new_withInvalidPattern_shouldFail() {
    assert!(CodeExtractor::new("&[").is_err());
}

/// Identical codes are restored by ordinal, never by content
#[test]
fn test_restore_withIdenticalCodes_shouldRestoreEachPlaceholderIndependently() {
    let extracted = CodeExtractor::default().extract("&4one &4two");
    assert_eq!(extracted.codes, vec!["&4".to_string(), "&4".to_string()]);

    let restored = CodeExtractor::restore("<<<2>>>zwei <<<1>>>eins <<<2>>>", &extracted.codes);
    assert_eq!(restored, "&4zwei &4eins <<<2>>>");
}

/// Without codes the restore step leaves any translation untouched
#[test]
fn test_restore_withoutCodes_shouldReturnTranslation() {
    let extracted = CodeExtractor::default().extract("Plain words");
    assert_eq!(extracted.cleaned, "Plain words");
    assert_eq!(CodeExtractor::restore("Einfache Wörter", &extracted.codes), "Einfache Wörter");
}
