use super::*;
use crate::{error::RegistryError, ngrams::NgramBounds, tree::GramTreeBuilder};
use float_cmp::approx_eq;
use rstest::*;

const ENGLISH_CORPUS: &[&str] = &[
    "the quick brown fox jumps over the lazy dog",
    "this is a text written in the english language",
    "detection works better with more training sentences",
    "what light through yonder window breaks",
];

const FRENCH_CORPUS: &[&str] = &[
    "le renard brun rapide saute par-dessus le chien paresseux",
    "ceci est un texte écrit dans la langue française",
    "la détection fonctionne mieux avec davantage de phrases",
    "quelle lumière jaillit par cette fenêtre",
];

fn tree_from(corpus: &[&str]) -> GramTree {
    let mut builder = GramTreeBuilder::new(NgramBounds::new(1, 3).unwrap());
    for line in corpus {
        builder.learn(line).unwrap();
    }
    builder.build()
}

#[fixture]
fn detector() -> Detector {
    let detector = Detector::new();
    detector.register("en", tree_from(ENGLISH_CORPUS)).unwrap();
    detector.register("fr", tree_from(FRENCH_CORPUS)).unwrap();
    detector
}

#[rstest(
    expected,
    text,
    case("en", "a text in english"),
    case("en", "the quick dog"),
    case("fr", "un texte en français"),
    case("fr", "la fenêtre est fermée")
)]
fn test_detect(detector: Detector, expected: &str, text: &str) {
    assert_eq!(detector.detect(text).as_deref(), Some(expected));
}

#[rstest]
fn test_detect_empty_text(detector: Detector) {
    assert_eq!(detector.detect(""), None);
}

#[test]
fn test_detect_on_empty_registry() {
    let detector = Detector::new();
    assert_eq!(detector.detect("some text"), None);
    assert!(detector.rank("some text").is_empty());
    assert!(detector.is_empty());
}

#[rstest]
fn test_detect_requires_positive_score(detector: Detector) {
    // no trained gram matches, every language scores zero
    assert_eq!(detector.detect("0123456789"), None);
}

#[rstest]
fn test_detect_among_restricts_languages(detector: Detector) {
    let text = "the quick brown fox";
    assert_eq!(detector.detect_among(text, ["fr"]).as_deref(), Some("fr"));
    assert_eq!(detector.detect_among(text, ["en", "fr"]).as_deref(), Some("en"));
    assert_eq!(detector.detect_among(text, ["de"]), None);
    assert_eq!(detector.detect_among(text, []), None);
}

#[rstest]
fn test_rank_is_sorted_descending(detector: Detector) {
    let ranked = detector.rank("the quick brown fox jumps");
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].0, "en");
    assert!(ranked[0].1 > ranked[1].1);
}

#[rstest]
fn test_rank_keeps_non_positive_scores(detector: Detector) {
    let ranked = detector.rank("0123456789");
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|(_, score)| *score == 0.0));
    // equal scores fall back to lexicographic code order
    assert_eq!(ranked[0].0, "en");
    assert_eq!(ranked[1].0, "fr");
}

#[rstest]
fn test_rank_among_set_equality(detector: Detector) {
    let ranked = detector.rank_among("the quick fox", ["en", "de"]);
    let codes: Vec<_> = ranked.iter().map(|(code, _)| code.as_str()).collect();
    assert_eq!(codes, ["en"]);
}

#[test]
fn test_tie_break_is_deterministic() {
    // both languages share the model, every score ties
    let twin = Detector::new();
    twin.register("bb", tree_from(ENGLISH_CORPUS)).unwrap();
    twin.register("aa", tree_from(ENGLISH_CORPUS)).unwrap();

    assert_eq!(twin.detect("the quick dog").as_deref(), Some("aa"));
    let ranked = twin.rank("the quick dog");
    assert_eq!(ranked[0].0, "aa");
    assert!(approx_eq!(f64, ranked[0].1, ranked[1].1, ulps = 2));
}

#[rstest]
fn test_register_overwrites(detector: Detector) {
    let before = detector.rank("the quick dog");
    detector.register("en", tree_from(FRENCH_CORPUS)).unwrap();
    let after = detector.rank("the quick dog");
    assert_eq!(before.len(), after.len());
    assert_ne!(before[0].1, after[0].1);
}

#[rstest]
fn test_sealed_registry_rejects_registration(detector: Detector) {
    detector.seal();
    assert!(detector.is_sealed());
    let err = detector.register("de", tree_from(ENGLISH_CORPUS));
    assert!(matches!(err, Err(RegistryError::Sealed)));

    // sealed instances keep serving queries
    assert_eq!(detector.detect("the quick dog").as_deref(), Some("en"));
    assert_eq!(detector.languages(), ["en", "fr"]);
}

#[rstest]
fn test_register_bytes_round_trip(detector: Detector) {
    let blob = crate::bin_model::encode_model(&tree_from(ENGLISH_CORPUS)).unwrap();
    detector.register_bytes("en2", &blob).unwrap();
    assert_eq!(detector.languages(), ["en", "en2", "fr"]);
    assert!(detector.detect_among("the quick dog", ["en2"]).is_some());
}

#[rstest]
fn test_register_bytes_rejects_garbage(detector: Detector) {
    let err = detector.register_bytes("xx", b"not a model");
    assert!(matches!(err, Err(RegistryError::Model(_))));
    assert_eq!(detector.languages(), ["en", "fr"]);
}

#[rstest]
fn test_concurrent_detection(detector: Detector) {
    let expected = detector.detect("the quick brown fox");
    ::std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| detector.detect("the quick brown fox")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
