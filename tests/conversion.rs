use proptest::prelude::*;
use treedeps::{Converter, Profile, Tree};

fn convert(profile: Profile, bracketed: &str) -> (Vec<String>, Vec<String>) {
    let converter = Converter::english().unwrap().with_profile(profile);
    let tree = Tree::from_bracketed(bracketed).unwrap();
    let conversion = converter.convert(&tree).unwrap();
    (conversion.basic.lines(), conversion.enhanced.lines())
}

fn has(lines: &[String], line: &str) -> bool {
    lines.iter().any(|l| l == line)
}

#[test]
fn test_prepositional_phrase_collapsed() {
    let (basic, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (NNP Sue)) (VP (VBD sat) (PP (IN on) (NP (DT the) (NN mat)))) (. .)))",
    );
    assert!(has(&basic, "nmod(sat-2, mat-5)"));
    assert!(has(&basic, "case(mat-5, on-3)"));
    assert!(has(&enhanced, "nmod:on(sat-2, mat-5)"));
    assert!(!enhanced.iter().any(|l| l.starts_with("case(")));
}

#[test]
fn test_coordinated_subjects() {
    let (_, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (NP (NNP John)) (CC and) (NP (NNP Mary))) (VP (VBD left))))",
    );
    assert!(has(&enhanced, "conj:and(John-1, Mary-3)"));
    assert!(has(&enhanced, "nsubj(left-4, John-1)"));
    assert!(has(&enhanced, "nsubj(left-4, Mary-3)"));
    assert!(!enhanced.iter().any(|l| l.starts_with("cc(")));
}

#[test]
fn test_passive_agent() {
    let (basic, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (DT the) (NN cake)) (VP (VBD was) (VP (VBN eaten) (PP (IN by) (NP (NNP John)))))))",
    );
    assert!(has(&basic, "nsubjpass(eaten-4, cake-2)"));
    assert!(has(&enhanced, "agent(eaten-4, John-6)"));
    assert!(has(&enhanced, "auxpass(eaten-4, was-3)"));
}

#[test]
fn test_controlled_infinitive() {
    let (basic, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (NNP Bill)) (VP (VBD tried) (S (VP (TO to) (VP (VB shoot))))) (. .)))",
    );
    assert!(has(&basic, "xcomp(tried-2, shoot-4)"));
    assert!(!has(&basic, "xsubj(shoot-4, Bill-1)"));
    assert!(has(&enhanced, "xsubj(shoot-4, Bill-1)"));
}

#[test]
fn test_relative_pronoun_replaced_by_antecedent() {
    //  the man [that I love] left
    let (basic, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (NP (DT the) (NN man)) (SBAR (WHNP (WDT that)) (S (NP (PRP I)) (VP (VBP love))))) (VP (VBD left))))",
    );
    assert!(has(&basic, "rcmod(man-2, love-5)"));
    assert!(has(&basic, "dobj(love-5, that-3)"));
    assert!(has(&basic, "nsubj(love-5, I-4)"));
    assert!(has(&enhanced, "dobj(love-5, man-2)"));
    assert!(has(&enhanced, "nsubj(left-6, man-2)"));
    assert!(!enhanced.iter().any(|l| l.starts_with("ref(") || l.starts_with("dep(")));
}

#[test]
fn test_relative_pronoun_as_subject() {
    //  the man [who left] slept
    let (basic, enhanced) = convert(
        Profile::Enhanced,
        "(ROOT (S (NP (NP (DT the) (NN man)) (SBAR (WHNP (WP who)) (S (VP (VBD left))))) (VP (VBD slept))))",
    );
    assert!(has(&basic, "rcmod(man-2, left-4)"));
    assert!(has(&basic, "nsubj(left-4, who-3)"));
    assert!(has(&enhanced, "nsubj(left-4, man-2)"));
    assert!(has(&enhanced, "nsubj(slept-5, man-2)"));
}

#[test]
fn test_conjoined_adpositions_share_object() {
    let text = "(ROOT (S (NP (NNP Sue)) (VP (VBZ flies) (PP (IN to) (CC and) (IN from) (NP (NNP Serbia))))))";
    let (basic, _) = convert(Profile::Enhanced, text);
    assert!(has(&basic, "case(Serbia-6, to-3)"));
    assert!(has(&basic, "conj(Serbia-6, from-5)"));

    for profile in [Profile::Enhanced, Profile::EnhancedPlusPlus] {
        let (_, enhanced) = convert(profile, text);
        assert!(has(&enhanced, "nmod:to(flies-2, Serbia-6)"));
        assert!(has(&enhanced, "nmod:from(flies-2, Serbia-6)"));
        assert!(!enhanced.iter().any(|l| l.contains("from-5") || l.contains("and-4")));
    }
}

#[test]
fn test_basic_profile_is_identity() {
    let text = "(ROOT (S (NP (NP (NNP John)) (CC and) (NP (NNP Mary))) (VP (VBD left))))";
    let (basic, enhanced) = convert(Profile::Basic, text);
    assert_eq!(basic, enhanced);
}

#[test]
fn test_conversion_is_deterministic() {
    let text = "(ROOT (S (NP (NNP Sue)) (VP (VBD sat) (PP (IN on) (NP (DT the) (NN mat)))) (. .)))";
    let first = convert(Profile::EnhancedPlusPlus, text);
    let second = convert(Profile::EnhancedPlusPlus, text);
    assert_eq!(first, second);
}

#[test]
fn test_batch_conversion() {
    let converter = Converter::english().unwrap();
    let trees: Vec<Tree> = [
        "(ROOT (S (NP (NNP Sue)) (VP (VBD slept))))",
        "(ROOT (FRAG (UH oh) (NN well)))",
    ]
    .iter()
    .map(|s| Tree::from_bracketed(s).unwrap())
    .collect();
    let results = converter.convert_all(&trees);
    assert!(results.iter().all(|r| r.is_ok()));
}

/// Bracketed trees over a small Penn vocabulary
fn arb_tree() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("(DT the)"),
        Just("(NN dog)"),
        Just("(NNP Sue)"),
        Just("(VBD saw)"),
        Just("(VB go)"),
        Just("(VBN taken)"),
        Just("(IN of)"),
        Just("(TO to)"),
        Just("(CC and)"),
        Just("(JJ big)"),
        Just("(WDT that)"),
        Just("(, ,)"),
    ]
    .prop_map(str::to_string);
    let label = prop_oneof![
        Just("NP"),
        Just("VP"),
        Just("S"),
        Just("PP"),
        Just("SBAR"),
        Just("ADJP"),
    ];
    leaf.prop_recursive(4, 24, 4, move |inner| {
        (label.clone(), prop::collection::vec(inner, 1..4))
            .prop_map(|(label, children)| format!("({} {})", label, children.join(" ")))
    })
    .prop_map(|body| format!("(ROOT {})", body))
}

proptest! {
    #[test]
    fn prop_basic_graph_is_tree(text in arb_tree()) {
        let converter = Converter::english().unwrap();
        let tree = Tree::from_bracketed(&text).unwrap();
        let conversion = converter.convert(&tree).unwrap();
        prop_assert!(conversion.basic.is_tree());
        prop_assert!(conversion.basic.edges().all(|e| !e.extra));
    }

    #[test]
    fn prop_dedup_is_idempotent(text in arb_tree()) {
        let converter = Converter::english().unwrap().with_profile(Profile::EnhancedPlusPlus);
        let tree = Tree::from_bracketed(&text).unwrap();
        let mut graph = converter.convert(&tree).unwrap().enhanced;
        graph.dedup();
        let once = graph.lines();
        graph.dedup();
        prop_assert_eq!(once, graph.lines());
    }
}
