//! Todos Persist entry point
//!
//! Handles platform-specific initialization and starts the todo app with
//! its flags hydrated from storage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent};

    use todos_persist::app::{Msg, TodoApp};
    use todos_persist::consts::MOUNT_NODE_ID;
    use todos_persist::storage::{KeyValueStore, LocalStorage, MemoryStore};
    use todos_persist::{BridgeConfig, launch};

    /// DOM nodes the app renders into
    struct View {
        document: Document,
        list: Element,
        footer: Element,
    }

    impl View {
        fn render(&self, app: &TodoApp) {
            self.list.set_inner_html("");
            for task in app.visible_tasks() {
                let Ok(li) = self.document.create_element("li") else {
                    continue;
                };
                li.set_text_content(Some(&task.description));
                let _ = li.set_attribute("data-id", &task.id.to_string());
                if task.completed {
                    let _ = li.set_attribute("class", "completed");
                }
                let _ = self.list.append_child(&li);
            }
            self.footer.set_text_content(Some(&app.items_left_label()));
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                log::warn!("{}; changes will not survive a reload", err);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Todos starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let root = document
            .get_element_by_id(MOUNT_NODE_ID)
            .ok_or("missing #app mount point")?;

        let app = Rc::new(RefCell::new(TodoApp::new()));
        launch(
            &mut *app.borrow_mut(),
            MOUNT_NODE_ID,
            open_store(),
            BridgeConfig::default(),
        );

        let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input.set_placeholder("What needs to be done?");
        let list = document.create_element("ul")?;
        let footer = document.create_element("footer")?;
        root.append_child(&input)?;
        root.append_child(&list)?;
        root.append_child(&footer)?;

        let view = Rc::new(View {
            document,
            list: list.clone(),
            footer,
        });
        view.render(&app.borrow());

        // Enter adds a task
        {
            let app = app.clone();
            let view = view.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() != "Enter" {
                    return;
                }
                let mut a = app.borrow_mut();
                a.update(Msg::UpdateField(input_clone.value()));
                a.update(Msg::Add);
                input_clone.set_value("");
                view.render(&a);
            });
            input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Clicking a task toggles it
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let Some(id) = target
                    .get_attribute("data-id")
                    .and_then(|id| id.parse::<u64>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                let completed = a
                    .model()
                    .tasks
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| !t.completed)
                    .unwrap_or(false);
                a.update(Msg::Check { id, completed });
                view.render(&a);
            });
            list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use todos_persist::app::{Msg, TodoApp};
    use todos_persist::consts::{MOUNT_NODE_ID, STORAGE_KEY};
    use todos_persist::{BridgeConfig, KeyValueStore, MemoryStore, launch};

    env_logger::init();
    log::info!("Todos (native) starting...");
    log::info!("Native mode keeps storage in memory - run with `trunk serve` for the web version");

    let store = MemoryStore::new();

    {
        let mut app = TodoApp::new();
        launch(&mut app, MOUNT_NODE_ID, store.clone(), BridgeConfig::default());
        for text in ["buy milk", "walk the dog"] {
            app.update(Msg::UpdateField(text.to_string()));
            app.update(Msg::Add);
        }
        app.update(Msg::Check { id: 0, completed: true });
    }

    match store.get_item(STORAGE_KEY) {
        Ok(Some(json)) => println!("{} = {}", STORAGE_KEY, json),
        Ok(None) => println!("{} is empty", STORAGE_KEY),
        Err(err) => eprintln!("{}", err),
    }

    // Second start sees the saved tasks
    let mut app = TodoApp::new();
    launch(&mut app, MOUNT_NODE_ID, store, BridgeConfig::default());
    for task in app.visible_tasks() {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("[{}] {}", mark, task.description);
    }
    println!("{}", app.items_left_label());
}
