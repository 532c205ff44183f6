use rstest::rstest;
use std::{cell::RefCell, rc::Rc};
use zephyr_dom::{cache::INDEX, Attributes, Component, Definition, Dom, Listeners, MemoryDom, NodeId, Options, Outcome, Phase, ShapePolicy, Template, Value};


fn mount(definition: &Definition<MemoryDom>) -> Component<MemoryDom> {
	Component::new("x-test", definition, MemoryDom::new()).unwrap()
}

fn labelled(template: impl 'static + Fn(&str) -> String) -> Definition<MemoryDom> {
	Definition::new()
		.set_template(Template::dynamic(move |this: &Component<MemoryDom>| template(&this.get("label").to_string())))
		.set_attributes(Attributes::new().with("label", "before"))
}

/// `(index, tag name)` of every indexed live element, in document order.
fn indexed(component: &Component<MemoryDom>) -> Vec<(String, String)> {
	let dom = component.dom();
	dom.query_all(&component.root(), INDEX)
		.unwrap()
		.into_iter()
		.map(|node| (dom.attribute(&node, INDEX).unwrap(), dom.tag_name(&node).unwrap()))
		.collect()
}

fn indexed_nodes(component: &Component<MemoryDom>) -> Vec<NodeId> {
	component.dom().query_all(&component.root(), INDEX).unwrap()
}

#[rstest]
#[case("<p>{}</p>", &["p"])]
#[case("<div><p><span>{}</span></p><ul><li>a</li><li>b</li></ul></div><footer></footer>", &["div", "p", "span", "ul", "li", "li", "footer"])]
#[case("<a></a><b><i><s><u>{}</u></s></i></b><c></c>", &["a", "b", "i", "s", "u", "c"])]
#[case("text {} only", &[])]
fn indices_follow_pre_order(#[case] template: &'static str, #[case] tags: &[&str]) {
	logging_::init();
	let mut component = mount(&labelled(move |label| template.replace("{}", label)));

	let expected: Vec<(String, String)> = tags.iter().enumerate().map(|(i, tag)| (i.to_string(), (*tag).to_owned())).collect();
	assert_eq!(indexed(&component), expected);
	let nodes = indexed_nodes(&component);

	component.set("label", "after").unwrap();
	assert_eq!(indexed(&component), expected);
	assert_eq!(indexed_nodes(&component), nodes);
}

#[test]
fn only_the_changed_descendant_is_replaced() {
	logging_::init();
	let mut component = mount(&labelled(|label| {
		format!("<div><p><span>{}</span></p><ul><li>a</li><li>b</li></ul></div><footer>end</footer>", label)
	}));
	let root = component.root();
	let nodes = indexed_nodes(&component);
	let ul = component.dom().find_tag(root, "ul").unwrap();
	let list = component.dom().outer_html(ul).unwrap();
	let mutations = component.dom().mutations();

	component.set("label", "after").unwrap();

	assert_eq!(component.dom().mutations() - mutations, 1);
	assert_eq!(indexed_nodes(&component), nodes);
	assert!(nodes.iter().all(|&node| component.dom().is_connected(node)));
	assert_eq!(component.dom().outer_html(ul).unwrap(), list);

	let span = component.dom().find_tag(root, "span").unwrap();
	assert_eq!(component.dom().text_content(span).unwrap(), "after");
	assert_eq!(
		component.last_outcome(),
		Some(Outcome {
			replaced: 1,
			..Outcome::default()
		})
	);
}

#[test]
fn identical_markup_mutates_nothing() {
	logging_::init();
	let mut component = mount(&labelled(|label| format!("<section><h1>{}</h1><p>body</p></section>", label)));
	let markup = component.dom().inner_html(&component.root()).unwrap();
	let mutations = component.dom().mutations();

	component.set("label", "before").unwrap();
	component.render().unwrap();

	assert_eq!(component.renders(), 3);
	assert_eq!(component.dom().mutations(), mutations);
	assert_eq!(component.dom().inner_html(&component.root()).unwrap(), markup);
	assert_eq!(component.last_outcome(), Some(Outcome::default()));
}

#[test]
fn mount_point_text_is_reconciled_around_its_elements() {
	logging_::init();
	let mut component = mount(&labelled(|label| format!("{}<hr>", label)));
	let hr = component.dom().find_tag(component.root(), "hr").unwrap();
	let mutations = component.dom().mutations();

	component.set("label", "after").unwrap();

	assert_eq!(component.dom().text_content(component.root()).unwrap(), "after");
	assert_eq!(
		component.last_outcome(),
		Some(Outcome {
			text_updates: 1,
			..Outcome::default()
		})
	);
	assert_eq!(component.dom().mutations() - mutations, 1);
	assert!(component.dom().is_connected(hr));
	assert_eq!(component.dom().inner_html(&component.root()).unwrap(), r#"after<hr :index="0">"#);
}

#[test]
fn typing_next_to_mount_point_text_keeps_the_input() {
	logging_::init();
	let definition = Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| format!(r#"Sum: {}<input :bind="x"><p>static</p>"#, this.get("x"))))
		.set_attributes(Attributes::new().with("x", 1))
		.set_listeners(Listeners::new().on("input", |_| Ok(())));
	let mut component = mount(&definition);
	let root = component.root();
	let input = component.dom().find_tag(root, "input").unwrap();
	let paragraph = component.dom().find_tag(root, "p").unwrap();

	component.dom_mut().set_value(&input, "5").unwrap();
	component.dispatch("input", Some(&input)).unwrap();

	assert_eq!(component.dom().text_content(root).unwrap(), "Sum: 5static");
	assert!(component.dom().is_connected(input));
	assert!(component.dom().is_connected(paragraph));
	assert_eq!(component.dom().value(&input).as_deref(), Some("5"));
	assert_eq!(component.last_outcome().map(|outcome| (outcome.replaced, outcome.text_updates)), Some((0, 1)));
}

fn reshaping(policy: ShapePolicy) -> Definition<MemoryDom> {
	Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| {
			if this.get("many").is_truthy() {
				"<div><span>a</span></div>".to_owned()
			} else {
				"<div><span>a</span><span>b</span></div>".to_owned()
			}
		}))
		.set_attributes(Attributes::new().with("many", false))
		.set_options(Options::default().with_shape_policy(policy))
}

#[test]
fn shape_changes_recache_by_default() {
	logging_::init();
	let mut component = mount(&reshaping(ShapePolicy::default()));
	let div = component.dom().find_tag(component.root(), "div").unwrap();

	component.set("many", true).unwrap();

	assert_eq!(component.last_outcome().map(|outcome| outcome.recached), Some(true));
	assert!(!component.dom().contains(div));
	assert_eq!(indexed(&component), vec![("0".to_owned(), "div".to_owned()), ("1".to_owned(), "span".to_owned())]);
	assert_eq!(component.dom().text_content(component.root()).unwrap(), "a");
}

#[test]
fn shape_changes_can_be_matched_by_position() {
	logging_::init();
	let mut component = mount(&reshaping(ShapePolicy::Skip));
	let div = component.dom().find_tag(component.root(), "div").unwrap();

	component.set("many", true).unwrap();

	let outcome = component.last_outcome().unwrap();
	assert!(!outcome.recached);
	assert!(component.dom().contains(div));
	assert_eq!(component.dom().text_content(component.root()).unwrap(), "a");
}

#[test]
fn recaching_brings_back_elements_removed_by_conditions() {
	logging_::init();
	let definition = Definition::new().set_template(Template::dynamic(|this: &Component<MemoryDom>| {
		let extra = if this.get("extra").is_truthy() { "<hr>" } else { "" };
		format!(r#"<p :if="show">note</p><span>{}</span>{}"#, this.get("extra"), extra)
	}));
	let mut component = mount(&definition.set_attributes(Attributes::new().with("show", false).with("extra", false)));
	let root = component.root();
	assert_eq!(component.dom().find_tag(root, "p"), None);

	component.set("show", true).unwrap();
	assert_eq!(component.dom().find_tag(root, "p"), None);

	component.set("extra", true).unwrap();

	assert_eq!(component.last_outcome().map(|outcome| outcome.recached), Some(true));
	let paragraph = component.dom().find_tag(root, "p").unwrap();
	assert_eq!(component.dom().text_content(paragraph).unwrap(), "note");
	assert_eq!(
		indexed(&component),
		vec![("0".to_owned(), "p".to_owned()), ("1".to_owned(), "span".to_owned()), ("2".to_owned(), "hr".to_owned())]
	);
}

#[test]
fn skipping_counts_elements_without_a_live_counterpart() {
	logging_::init();
	let definition = Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| {
			if this.get("more").is_truthy() {
				"<ul><li>a</li><li>b</li></ul><p>new</p>".to_owned()
			} else {
				"<ul><li>a</li></ul>".to_owned()
			}
		}))
		.set_attributes(Attributes::new().with("more", false))
		.set_options(Options::default().with_shape_policy(ShapePolicy::Skip));
	let mut component = mount(&definition);
	let root = component.root();
	let ul = component.dom().find_tag(root, "ul").unwrap();

	component.set("more", true).unwrap();

	let outcome = component.last_outcome().unwrap();
	assert!(!outcome.recached);
	assert_eq!(outcome.skipped, 1);
	assert!(component.dom().is_connected(ul));
	assert_eq!(component.dom().find_tag(root, "p"), None);
	assert_eq!(component.dom().text_content(ul).unwrap(), "ab");
}

#[test]
fn phases_advance_with_each_render() {
	logging_::init();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let recorded = Rc::clone(&seen);
	let definition = Definition::new().set_template(Template::dynamic(move |this: &Component<MemoryDom>| {
		recorded.borrow_mut().push(this.phase());
		"<p></p>".to_owned()
	}));

	let mut component = mount(&definition);
	assert_eq!(component.phase(), Phase::FirstRendered);
	component.render().unwrap();
	assert_eq!(component.phase(), Phase::Rendered);
	component.render().unwrap();

	assert_eq!(*seen.borrow(), vec![Phase::Constructed, Phase::FirstRendered, Phase::Rendered]);
	assert_eq!(component.phase(), Phase::Rendered);
}

#[test]
fn elements_beyond_the_depth_limit_are_replaced_with_their_parent_content() {
	logging_::init();
	let definition = labelled(|label| format!("<div><p><span>{}</span></p></div>", label)).set_options(Options::default().with_depth_limit(2));
	let mut component = mount(&definition);
	let root = component.root();
	assert_eq!(indexed(&component), vec![("0".to_owned(), "div".to_owned()), ("1".to_owned(), "p".to_owned())]);
	let span = component.dom().find_tag(root, "span").unwrap();
	let mutations = component.dom().mutations();

	component.set("label", Value::from("after")).unwrap();

	assert_eq!(component.dom().mutations() - mutations, 1);
	assert!(!component.dom().contains(span));
	assert_eq!(component.dom().text_content(root).unwrap(), "after");
}
