//! End-to-end rendering tests: deterministic output via snapshots, stochastic
//! output via membership and frequency checks.
//!
//! Run with tracing: RUST_LOG=debug cargo test --features tracing -- --nocapture

use std::collections::{BTreeMap, BTreeSet};

use insta::assert_snapshot;
use rand::SeedableRng;
use rand::rngs::StdRng;
use varitex::errors::{Error, ParseError, RenderError};
use varitex::render::{CustomHandler, StyleWeights};
use varitex::{
    ArgSignature, ArgumentSlot, MacroRegistry, Node, RenderOptions, Renderer, parse,
    render_to_text, render_with_registry,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn canonical(source: &str) -> String {
    init_tracing();
    render_to_text(source, &RenderOptions::canonical()).unwrap()
}

fn seeded(source: &str, seed: u64) -> String {
    render_to_text(source, &RenderOptions::seeded(seed)).unwrap()
}

/// Render `source` once per seed and count each distinct output
fn histogram(source: &str, seeds: std::ops::Range<u64>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for seed in seeds {
        *counts.entry(seeded(source, seed)).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// Deterministic constructs
// =============================================================================

#[test]
fn fractions() {
    assert_snapshot!(canonical(r"\frac{a}{b}"), @"a/b");
    assert_snapshot!(canonical(r"\frac{a+1}{b}"), @"(a+1)/b");
    assert_snapshot!(canonical(r"\frac{x+1}{y-2}"), @"(x+1)/(y-2)");
    assert_snapshot!(canonical(r"\tfrac{ a }{ b }"), @"a/b");
    assert_snapshot!(canonical(r"\frac{3}{4} + \frac{1}{2}"), @"3/4 + 1/2");
}

#[test]
fn binomials_and_boxes() {
    assert_snapshot!(canonical(r"\binom{n}{k}"), @"C(n,k)");
    assert_snapshot!(canonical(r"\boxed{\boxed{5}}"), @"[[5]]");
    assert_snapshot!(canonical(r"The answer is \boxed{\frac{5}{4}}"), @"The answer is [5/4]");
}

#[test]
fn wrappers_and_scripts() {
    assert_snapshot!(canonical(r"\mathrm{e}^{i\pi}"), @"e^ipi");
    assert_snapshot!(canonical(r"\text{if} x_{i+1} \in \mathbb{R}"), @"if x_(i+1) ∈ R");
    assert_snapshot!(canonical(r"\sum_{i=1}^{n} x_i"), @r"\sum_(i=1)^n x_(i)");
    assert_snapshot!(canonical(r"\frac{d}{dx}\left(x\right)"), @"d/dx(x)");
}

#[test]
fn symbol_table() {
    assert_snapshot!(canonical(r"x \leq y \geq z \neq w"), @"x <= y >= z != w");
    assert_snapshot!(canonical(r"\pm \sqrt{2} \approx 1.41"), @"+/- sqrt(2) ~ 1.41");
    assert_snapshot!(canonical(r"\emptyset \cup \{1,2\}"), @"∅ ∪ {1,2}");
    assert_snapshot!(canonical(r"\langle x \rangle"), @"< x >");
    assert_snapshot!(canonical(r"a\,b\!c"), @"a bc");
}

#[test]
fn root_index_fallbacks() {
    assert_snapshot!(canonical(r"\sqrt[n]{x}"), @"x^(1/n)");
    assert_snapshot!(canonical(r"\sqrt[3]{x+y}"), @"(x+y)^(1/3)");
    assert_snapshot!(canonical(r"\sqrt[4]{x}"), @"x^0.25");
    assert_snapshot!(canonical(r"\sqrt[0]{x}"), @"x^(1/0)");
}

#[test]
fn unknown_construct_renders_its_name() {
    let registry = MacroRegistry::standard();
    let options = RenderOptions::canonical();
    let foo = Node::construct(
        "foo",
        vec![
            ArgumentSlot::mandatory(vec![Node::text("x")]),
            ArgumentSlot::optional(Some(vec![Node::text("y")])),
        ],
    );
    let text = Renderer::new(&registry, &options)
        .render(&[foo], &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(text, "foo");

    // From source, an unknown word takes no arguments
    assert_snapshot!(canonical(r"\foo{x}"), @"foox");
}

// =============================================================================
// Stochastic constructs
// =============================================================================

#[test]
fn same_seed_same_output() {
    let source = r"\alpha + \sqrt[3]{\pi} \times \infty - \sqrt{\beta}";
    for seed in 0..50 {
        assert_eq!(seeded(source, seed), seeded(source, seed));
    }
}

#[test]
fn seeds_produce_variations() {
    let counts = histogram(r"\alpha \beta \gamma \pi \infty \sqrt{x}", 0..50);
    assert!(counts.len() > 1, "{counts:?}");
}

#[test]
fn square_root_renderings() {
    let allowed: BTreeSet<&str> = ["sqrt(x)", "x^0.5", "x**0.5", "x^(1/2)", "x**(1/2)"].into();
    for source in [r"\sqrt{x}", r"\sqrt[2]{x}"] {
        let counts = histogram(source, 0..500);
        let seen: BTreeSet<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(seen, allowed, "{source}: {counts:?}");
    }
}

#[test]
fn complex_radicand_is_parenthesized() {
    for (text, _) in histogram(r"\sqrt{x^2 + 1}", 0..200) {
        assert!(
            text == "sqrt(x^2 + 1)" || text.starts_with("(x^2 + 1)^") || text.starts_with("(x^2 + 1)**"),
            "{text}"
        );
    }
}

#[test]
fn greek_symbol_frequency() {
    let nodes = parse::parse(r"\alpha", MacroRegistry::shared()).unwrap();
    let options = RenderOptions::default();
    let renderer = Renderer::new(MacroRegistry::shared(), &options);
    let mut rng = StdRng::seed_from_u64(2024);

    let runs = 10_000;
    let symbols = (0..runs)
        .filter(|_| renderer.render(&nodes, &mut rng).unwrap() == "α")
        .count();
    let ratio = symbols as f64 / runs as f64;
    assert!((ratio - 0.2).abs() < 0.02, "symbol ratio was {ratio}");
}

#[test]
fn infinity_frequencies() {
    let nodes = vec![Node::symbol("infty")];
    let options = RenderOptions::default();
    let renderer = Renderer::new(MacroRegistry::shared(), &options);
    let mut rng = StdRng::seed_from_u64(99);

    let runs = 10_000;
    let mut counts = BTreeMap::new();
    for _ in 0..runs {
        *counts.entry(renderer.render(&nodes, &mut rng).unwrap()).or_insert(0usize) += 1;
    }
    for (form, expected) in [("infinity", 0.4), ("inf", 0.4), ("∞", 0.2)] {
        let ratio = counts.get(form).copied().unwrap_or(0) as f64 / runs as f64;
        assert!((ratio - expected).abs() < 0.03, "{form}: {ratio}");
    }
}

#[test]
fn pi_frequencies() {
    let nodes = vec![Node::symbol("pi")];
    let options = RenderOptions::default();
    let renderer = Renderer::new(MacroRegistry::shared(), &options);
    let mut rng = StdRng::seed_from_u64(314);

    let runs = 10_000;
    let mut counts = BTreeMap::new();
    for _ in 0..runs {
        *counts.entry(renderer.render(&nodes, &mut rng).unwrap()).or_insert(0usize) += 1;
    }
    assert_eq!(counts.len(), 2, "{counts:?}");
    for (form, expected) in [("pi", 0.8), ("π", 0.2)] {
        let ratio = counts.get(form).copied().unwrap_or(0) as f64 / runs as f64;
        assert!((ratio - expected).abs() < 0.02, "{form}: {ratio}");
    }
}

#[test]
fn weight_overrides() {
    let weights = StyleWeights {
        greek: [0.0, 1.0],
        pi: [0.0, 1.0],
        ..StyleWeights::default()
    };
    let options = RenderOptions::seeded(5).with_weights(weights);
    let text = render_to_text(r"\alpha\pi\Omega", &options).unwrap();
    assert_eq!(text, "απΩ");
}

#[test]
fn extreme_weights_still_render() {
    let weights = StyleWeights {
        pi: [f64::MAX, f64::MAX],
        greek: [f64::INFINITY, 1.0],
        ..StyleWeights::default()
    };
    let mut seen = BTreeSet::new();
    for seed in 0..200 {
        let options = RenderOptions::seeded(seed).with_weights(weights.clone());
        let text = render_to_text(r"\pi \alpha", &options).unwrap();
        let (pi, alpha) = text.split_once(' ').unwrap();
        assert_eq!(alpha, "alpha");
        seen.insert(pi.to_string());
    }
    assert_eq!(seen, BTreeSet::from(["pi".to_string(), "π".to_string()]));
}

#[test]
fn comment_separator() {
    let options = RenderOptions::canonical().with_comment_separator(" ");
    let text = render_to_text("a% dropped\nb", &options).unwrap();
    assert_eq!(text, "a b");
    assert_snapshot!(canonical("a% dropped\nb"), @"ab");
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn custom_handlers_override_and_extend() {
    let mut registry = MacroRegistry::standard();
    registry.register(
        "boxed",
        ArgSignature::mandatory(1),
        CustomHandler::new(|call, _cx| Ok(format!("<{}>", call.text(0).unwrap_or_default()))),
    );
    registry.register(
        "twice",
        ArgSignature::parse("{").unwrap(),
        CustomHandler::lazy(|call, cx| {
            let nodes = call.nodes(0).unwrap_or_default();
            Ok(format!("{}{}", cx.render(nodes)?, cx.render(nodes)?))
        }),
    );

    let options = RenderOptions::canonical();
    let text = render_with_registry(r"\boxed{x} \twice{ab}", &registry, &options).unwrap();
    assert_eq!(text, "<x> abab");

    // The shared standard registry is untouched
    assert_snapshot!(canonical(r"\boxed{x}"), @"[x]");
}

#[test]
fn concurrent_renders_share_one_registry() {
    let registry = MacroRegistry::standard();
    let source = r"\frac{\alpha}{\sqrt[3]{x+\pi}} + \infty";

    let sequential: Vec<String> = (0..8)
        .map(|seed| render_with_registry(source, &registry, &RenderOptions::seeded(seed)).unwrap())
        .collect();

    let concurrent: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|seed| {
                let registry = &registry;
                scope.spawn(move || {
                    render_with_registry(source, registry, &RenderOptions::seeded(seed)).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn parse_errors_surface() {
    let err = render_to_text(r"\frac{a}", &RenderOptions::canonical()).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::MissingArgument { .. })), "{err:?}");

    let err = render_to_text(r"{unclosed", &RenderOptions::canonical()).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Syntax { .. })), "{err:?}");
}

#[test]
fn depth_limit_fails_whole_render() {
    let source = format!("{}x{}", r"\boxed{".repeat(100), "}".repeat(100));
    let options = RenderOptions::canonical().with_max_depth(64);
    let err = render_to_text(source.as_str(), &options).unwrap_err();
    assert!(
        matches!(err, Error::Render(RenderError::DepthExceeded { limit: 64 })),
        "{err:?}"
    );

    let options = RenderOptions::canonical();
    let text = render_to_text(source.as_str(), &options).unwrap();
    assert_eq!(text, format!("{}x{}", "[".repeat(100), "]".repeat(100)));
}

#[test]
fn depth_limit_counts_every_level() {
    let nested = |n: usize| format!("{}x{}", r"\boxed{".repeat(n), "}".repeat(n));
    let options = RenderOptions::canonical().with_max_depth(64);

    let text = render_to_text(nested(63).as_str(), &options).unwrap();
    assert_eq!(text, format!("{}x{}", "[".repeat(63), "]".repeat(63)));

    let err = render_to_text(nested(64).as_str(), &options).unwrap_err();
    assert!(
        matches!(err, Error::Render(RenderError::DepthExceeded { limit: 64 })),
        "{err:?}"
    );
}

#[test]
fn deep_source_renders_on_a_small_stack() {
    let worker = std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(|| {
            let source = format!("{}x{}", r"\boxed{".repeat(500), "}".repeat(500));
            render_to_text(source.as_str(), &RenderOptions::canonical())
        })
        .unwrap();
    let text = worker.join().unwrap().unwrap();
    assert_eq!(text, format!("{}x{}", "[".repeat(500), "]".repeat(500)));
}
