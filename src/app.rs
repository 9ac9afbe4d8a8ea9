use crate::err;
use crate::nodes::events::Event;
use crate::nodes::node::Node;
use crate::reactivity::effect::{run_effect, Effect};
use crate::render::dom::{DomTree, ElementIdx};
use crate::render::renderer::render;
use crate::render::surface::OutputSurface;
use crate::result::VireoResult;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::debug;

/// Keeps an output surface in sync with state by rebuilding it whenever
/// anything read during the last build changes
pub struct App<S: OutputSurface> {
    surface: Rc<RefCell<S>>,
    root: S::Handle,
    effect: Option<Effect>,
}

impl<S: OutputSurface + 'static> App<S>
where
    S::Handle: 'static,
{
    pub fn new(surface: S, root: S::Handle) -> Self {
        Self::with_shared_surface(Rc::new(RefCell::new(surface)), root)
    }

    pub fn with_shared_surface(surface: Rc<RefCell<S>>, root: S::Handle) -> Self {
        Self {
            surface,
            root,
            effect: None,
        }
    }

    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn shared_surface(&self) -> Rc<RefCell<S>> {
        self.surface.clone()
    }

    pub fn root(&self) -> &S::Handle {
        &self.root
    }

    pub fn is_mounted(&self) -> bool {
        self.effect.is_some()
    }

    /// Render `build` into the root now, and again after every change to
    /// state it read
    ///
    /// Each run clears the root and renders the whole tree afresh.
    /// Mounting again replaces the previous build function.
    pub fn mount(&mut self, build: impl Fn() -> VireoResult<Node> + 'static) -> VireoResult<()> {
        if let Some(previous) = self.effect.take() {
            previous.dispose();
        }
        let surface = self.surface.clone();
        let root = self.root.clone();
        let effect = run_effect(move || {
            let tree = build()?;
            let mut surface = surface
                .try_borrow_mut()
                .map_err(|_| err!(Render: "Output surface is busy"))?;
            surface.clear_children(&root)?;
            render(&tree, &mut *surface, &root)
        })?;
        debug!("Mounted app as effect {}", effect.id());
        self.effect = Some(effect);
        Ok(())
    }

    /// Stop reacting to state changes and clear the root
    pub fn unmount(&mut self) -> VireoResult<()> {
        if let Some(effect) = self.effect.take() {
            debug!("Unmounting app effect {}", effect.id());
            effect.dispose();
        }
        self.surface.borrow_mut().clear_children(&self.root)
    }
}

impl App<DomTree> {
    /// Invoke the element's `on<event>` handler
    ///
    /// Returns `false` when the element has no handler for the event.
    pub fn dispatch_event(&self, element: &ElementIdx, event: &Event) -> VireoResult<bool> {
        let handler = self.surface.borrow().event_handler(element, event.name())?;
        let Some(handler) = handler else {
            return Ok(false);
        };
        debug!("Dispatching {} to {:?}", event.name(), element);
        handler.call(event)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::component::define_component;
    use crate::nodes::node::{h, Attributes, Children};
    use crate::reactivity::reference::make_ref;
    use crate::reactivity::tracked::make_tracked;
    use crate::result::VireoErrorKind;
    use bevy_reflect::Reflect;
    use expect_test::expect;
    use std::cell::Cell;

    #[derive(Debug, Reflect)]
    struct Counter {
        count: i32,
    }

    fn dom_app() -> App<DomTree> {
        let dom = DomTree::new("div");
        let root = dom.root();
        App::new(dom, root)
    }

    #[test]
    fn test_rerender_on_change() {
        let state = make_tracked(Counter { count: 0 }).unwrap();
        let mut app = dom_app();
        let build_state = state.clone();
        app.mount(move || {
            let count: i32 = build_state.get("count")?;
            Ok(h("p", None, format!("count: {}", count)))
        })
        .unwrap();
        let root = *app.root();
        assert_eq!("count: 0", app.surface().text_content(&root).unwrap());

        state.update("count", |count: &mut i32| *count += 1).unwrap();
        assert_eq!("count: 1", app.surface().text_content(&root).unwrap());
        assert_eq!(1, app.surface().children(&root).unwrap().len());
    }

    #[test]
    fn test_ref_write_rebuilds_once() {
        let message = make_ref("world".to_string());
        let builds = Rc::new(Cell::new(0));
        let mut app = dom_app();
        let build_message = message.clone();
        let build_count = builds.clone();
        app.mount(move || {
            build_count.set(build_count.get() + 1);
            Ok(h("span", None, build_message.get()))
        })
        .unwrap();
        message.set("there".to_string()).unwrap();
        assert_eq!(2, builds.get());
        expect![[r#"<div><span>there</span></div>"#]].assert_eq(&app.surface().to_html().unwrap());
    }

    #[test]
    fn test_unmount_stops_updates() {
        let message = make_ref("a".to_string());
        let mut app = dom_app();
        let build_message = message.clone();
        app.mount(move || Ok(h("span", None, build_message.get())))
            .unwrap();
        assert!(app.is_mounted());
        app.unmount().unwrap();
        assert!(!app.is_mounted());
        message.set("b".to_string()).unwrap();
        expect![[r#"<div></div>"#]].assert_eq(&app.surface().to_html().unwrap());
        assert_eq!(0, message.dependents());
    }

    #[test]
    fn test_remount_replaces_build() {
        let message = make_ref("a".to_string());
        let mut app = dom_app();
        let first_message = message.clone();
        app.mount(move || Ok(h("i", None, first_message.get())))
            .unwrap();
        let second_message = message.clone();
        app.mount(move || Ok(h("b", None, second_message.get())))
            .unwrap();
        message.set("z".to_string()).unwrap();
        expect![[r#"<div><b>z</b></div>"#]].assert_eq(&app.surface().to_html().unwrap());
        assert_eq!(1, message.dependents());
    }

    #[test]
    fn test_build_error_surfaces_on_write() {
        let count = make_ref(0);
        let mut app = dom_app();
        let build_count = count.clone();
        app.mount(move || {
            if build_count.get() > 0 {
                crate::bail!(Build: "count too high");
            }
            Ok(h("p", None, "ok"))
        })
        .unwrap();
        let error = count.set(1).unwrap_err();
        assert_eq!(&VireoErrorKind::Build("count too high".to_string()), error.kind());
    }

    #[test]
    fn test_failed_first_mount_does_not_react() {
        let count = make_ref(0);
        let builds = Rc::new(Cell::new(0));
        let mut app = dom_app();
        let build_count = count.clone();
        let build_runs = builds.clone();
        let error = app
            .mount(move || {
                build_runs.set(build_runs.get() + 1);
                if build_count.get() == 0 {
                    crate::bail!(Build: "not ready");
                }
                Ok(h("p", None, "ok"))
            })
            .unwrap_err();
        assert!(matches!(error.kind(), VireoErrorKind::Build(_)));
        assert!(!app.is_mounted());
        assert_eq!(0, count.dependents());

        app.unmount().unwrap();
        count.set(1).unwrap();
        assert_eq!(1, builds.get());
        expect![[r#"<div></div>"#]].assert_eq(&app.surface().to_html().unwrap());
    }

    #[test]
    fn test_counter_and_input_scenario() {
        let state = make_tracked(Counter { count: 0 }).unwrap();
        let message = make_ref("world".to_string());
        let hello = define_component(
            "Hello",
            |attributes| Ok(attributes.text("msg").unwrap_or_default().to_string()),
            |text| Ok(h("div", None, format!("Hello, {text}"))),
        );
        let mut app = dom_app();
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
                    h("h1", None, "Counter"),
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
        })
        .unwrap();
        expect![[r#"<div><div><h1>Counter</h1><button>count: 0</button><input value="world"><div>Hello, world</div></div></div>"#]]
            .assert_eq(&app.surface().to_html().unwrap());

        let button = app.surface().find_by_tag("button")[0];
        assert!(app.dispatch_event(&button, &Event::click()).unwrap());
        expect![[r#"<div><div><h1>Counter</h1><button>count: 1</button><input value="world"><div>Hello, world</div></div></div>"#]]
            .assert_eq(&app.surface().to_html().unwrap());

        let stale = app.dispatch_event(&button, &Event::click()).unwrap_err();
        assert!(matches!(stale.kind(), VireoErrorKind::Render(_)));

        let input = app.surface().find_by_tag("input")[0];
        assert!(app.dispatch_event(&input, &Event::input("there")).unwrap());
        expect![[r#"<div><div><h1>Counter</h1><button>count: 1</button><input value="there"><div>Hello, there</div></div></div>"#]]
            .assert_eq(&app.surface().to_html().unwrap());

        let heading = app.surface().find_by_tag("h1")[0];
        assert!(!app.dispatch_event(&heading, &Event::click()).unwrap());
    }
}
