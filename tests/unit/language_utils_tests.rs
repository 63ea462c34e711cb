/*!
 * Tests for language utility functions
 */

use docutrans::language_utils::{
    AUTO_DETECT_LANGUAGE, display_name, file_tag, get_language_name, is_auto_detect, normalize_to_part2t,
};

/// Test normalizing ISO 639-1 and 639-2 codes
#[test]
fn test_normalizeToPart2t_withVariousCodes_shouldReturnTerminologyCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("FR").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t(" spa ").unwrap(), "spa");
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("English").is_err());
}

/// Test language name lookup
#[test]
fn test_getLanguageName_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert_eq!(get_language_name("jpn").unwrap(), "Japanese");
    assert!(get_language_name("zz").is_err());
}

/// Free-form names and the sentinel are kept as written
#[test]
fn test_displayName_shouldKeepFreeFormNames() {
    assert_eq!(display_name("it"), "Italian");
    assert_eq!(display_name("Spanish (Argentina)"), "Spanish (Argentina)");
    assert_eq!(display_name("detect language"), AUTO_DETECT_LANGUAGE);
    assert!(is_auto_detect(" Detect Language "));
    assert!(!is_auto_detect("English"));
}

/// File tags are short and file-name safe
#[test]
fn test_fileTag_shouldPreferTwoLetterCodes() {
    assert_eq!(file_tag("spa"), "es");
    assert_eq!(file_tag("French"), "fr");
    assert_eq!(file_tag("Spanish (Argentina)"), "spanish-argentina");
}
