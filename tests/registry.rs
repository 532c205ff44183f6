use rstest::rstest;
use zephyr_dom::{is_valid_name, Definition, Error, MemoryDom, Registry};


fn text(markup: &str) -> Definition<MemoryDom> {
	Definition::new().set_template(markup)
}

#[rstest]
#[case("x-counter", true)]
#[case("my-fancy-button", true)]
#[case("counter", false)]
#[case("X-counter", false)]
#[case("x-Counter", false)]
#[case("-counter", false)]
#[case("1-counter", false)]
#[case("x counter-", false)]
fn custom_element_names(#[case] name: &str, #[case] valid: bool) {
	assert_eq!(is_valid_name(name), valid);
}

#[test]
fn duplicates_keep_the_first_definition() {
	logging_::init();
	let mut registry = Registry::new();
	registry.register("x-greeting", text("<p>first</p>")).register("x-greeting", text("<p>second</p>"));

	assert_eq!(registry.len(), 1);
	let component = registry.create("x-greeting", MemoryDom::new()).unwrap();
	assert_eq!(component.dom().text_content(component.root()).unwrap(), "first");
}

#[test]
fn invalid_names_are_ignored() {
	logging_::init();
	let mut registry = Registry::new();
	registry.register("greeting", text("<p>hi</p>"));

	assert!(registry.is_empty());
	assert!(!registry.contains("greeting"));
}

#[test]
fn unknown_components_cannot_be_created() {
	logging_::init();
	let registry = Registry::<MemoryDom>::new();
	assert!(matches!(registry.create("x-missing", MemoryDom::new()), Err(Error::UnknownComponent(name)) if name == "x-missing"));
}

#[test]
fn mount_all_creates_one_instance_per_name_in_order() {
	logging_::init();
	let mut registry = Registry::new();
	registry.register("x-second", text("<p>2</p>")).register("x-first", text("<p>1</p>"));

	let mut requested = Vec::new();
	let mounted = registry
		.mount_all(|name| {
			requested.push(name.to_owned());
			Ok(MemoryDom::new())
		})
		.unwrap();

	assert_eq!(requested, ["x-second", "x-first"]);
	assert_eq!(registry.names().collect::<Vec<_>>(), ["x-second", "x-first"]);
	let content: Vec<(String, String)> = mounted
		.iter()
		.map(|component| (component.name().to_owned(), component.dom().text_content(component.root()).unwrap()))
		.collect();
	assert_eq!(content, [("x-second".to_owned(), "2".to_owned()), ("x-first".to_owned(), "1".to_owned())]);
}

#[test]
fn failing_factories_abort_mounting() {
	logging_::init();
	let mut registry = Registry::new();
	registry.register("x-only", text("<p>only</p>"));

	let result = registry.mount_all(|_| Err(Error::Dom("no document".to_owned())));
	assert!(matches!(result, Err(Error::Dom(message)) if message == "no document"));
}
