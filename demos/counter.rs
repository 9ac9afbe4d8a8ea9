use bevy_reflect::Reflect;
use log::{error, info};
use vireo::app::App;
use vireo::config::VireoConfig;
use vireo::logging::init_logging;
use vireo::nodes::{define_component, h, Attributes, Children, Event, Node};
use vireo::reactivity::{configure, make_ref, make_tracked};
use vireo::render::DomTree;
use vireo::result::VireoResult;

#[derive(Debug, Reflect)]
struct CounterState {
    count: i32,
}

fn main() {
    if let Err(error) = main_internal() {
        error!("Aborted with error: {:?}", error);
        std::process::exit(1);
    }
}

fn main_internal() -> VireoResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => VireoConfig::load(path)?,
        None => VireoConfig::default(),
    };
    init_logging(&config.logging)?;
    configure(config.reactivity);
    info!("Vireo counter demo starting");

    let state = make_tracked(CounterState { count: 0 })?;
    let message = make_ref("world".to_string());
    let hello = define_component(
        "Hello",
        |attributes| Ok(attributes.text("msg").unwrap_or_default().to_string()),
        |text| Ok(h("div", None, format!("Hello, {text}"))),
    );

    let dom = DomTree::new("div");
    let root = dom.root();
    let mut app = App::new(dom, root);
    let build_state = state.clone();
    let build_message = message.clone();
    app.mount(move || {
        let click_state = build_state.clone();
        let input_message = build_message.clone();
        let count: i32 = build_state.get("count")?;
        Ok(h(
            "div",
            None,
            vec![
                h("h1", None, "Vireo counter"),
                Node::element("button")
                    .on("click", move |_| {
                        click_state.update("count", |count: &mut i32| *count += 1)
                    })
                    .text(format!("count: {count}")),
                Node::element("input")
                    .attr("value", build_message.get())
                    .on("input", move |event| {
                        input_message.set(event.value().unwrap_or_default().to_string())
                    }),
                h(
                    hello.clone(),
                    Some(Attributes::new().with("msg", build_message.get())),
                    Children::None,
                ),
            ],
        ))
    })?;
    println!("{}", app.surface().to_html()?);

    for _ in 0..2 {
        let button = app
            .surface()
            .find_by_tag("button")
            .first()
            .copied()
            .ok_or("No button rendered")?;
        app.dispatch_event(&button, &Event::click())?;
        println!("{}", app.surface().to_html()?);
    }

    let input = app
        .surface()
        .find_by_tag("input")
        .first()
        .copied()
        .ok_or("No input rendered")?;
    app.dispatch_event(&input, &Event::input("there"))?;
    println!("{}", app.surface().to_tree()?);
    info!("Vireo counter demo finished");
    Ok(())
}
