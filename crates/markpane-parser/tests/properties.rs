//! Property tests for container parsing and size hints.

use markdown_it::plugins::cmark;
use markpane_parser::plugins::add_container_plugin;
use markpane_parser::plugins::container::{ContainerNode, CONTAINER_CLASSES};
use markpane_parser::plugins::media::size_style;
use markpane_parser::MarkdownIt;
use proptest::prelude::*;

fn parser() -> MarkdownIt {
    let mut md = MarkdownIt::new();
    cmark::add(&mut md);
    add_container_plugin(&mut md);
    md
}

fn class() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CONTAINER_CLASSES.to_vec())
}

/// Nested containers, outermost first.
fn nested(classes: &[&str], body: &str) -> String {
    let mut source = String::new();
    for class in classes {
        source.push_str(&format!("::: {class}\n"));
    }
    source.push_str(body);
    source.push('\n');
    for _ in classes {
        source.push_str(":::\n");
    }
    source
}

proptest! {
    #[test]
    fn balanced_containers_all_open_and_close(
        classes in prop::collection::vec(class(), 1..5),
        body in "[a-z]{1,12}",
    ) {
        let ast = parser().parse(&nested(&classes, &body));

        let mut found = Vec::new();
        ast.walk(|node, _| {
            if let Some(container) = node.cast::<ContainerNode>() {
                found.push(container.class.clone());
            }
        });
        prop_assert_eq!(&found, &classes);

        let html = ast.render();
        prop_assert_eq!(html.matches("<div").count(), classes.len());
        prop_assert_eq!(html.matches("</div>").count(), classes.len());
        for class in &classes {
            let expected = format!("class=\"alert {}\"", class);
            prop_assert!(html.contains(&expected));
        }
    }

    #[test]
    fn unknown_class_reproduces_text(class in "[a-z]{3,10}", body in "[a-z]{1,12}") {
        prop_assume!(!CONTAINER_CLASSES.contains(&class.as_str()));
        let html = parser().parse(&format!("::: {class}\n{body}\n:::")).render();
        prop_assert!(!html.contains("<div"));
        let expected = format!("::: {}", class);
        prop_assert!(html.contains(&expected));
        prop_assert!(html.contains(&body));
    }

    #[test]
    fn size_hint_declares_aspect_ratio(vw in 1u32..4000, vh in 1u32..4000) {
        let style = size_style(&format!("a.png?vw={vw}&vh={vh}"));
        prop_assert_eq!(style, Some(format!("width:{vw}px;aspect-ratio:{vw}/{vh}")));
    }

    #[test]
    fn bad_size_hint_emits_nothing(vw in "(0|-[1-9]|[a-z]{1,4})?", vh in 1u32..4000) {
        let style = size_style(&format!("a.png?vw={vw}&vh={vh}"));
        prop_assert_eq!(style, None);
    }
}
