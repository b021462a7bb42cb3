pub mod error;

pub mod config;

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod key_bindings;
    pub use key_bindings::KeyBindings;

    pub mod action_dispatcher;
    pub use action_dispatcher::Dispatcher;

    pub mod event_loop;
    pub use event_loop::{Effect, EventLoop, TaskResult};
}

pub mod model {
    pub mod app_state;

    pub mod entry_filter;
    pub use entry_filter::{EntryFilter, EntrySort};

    pub mod fs_state;
    pub use fs_state::{FSState, Tab};

    pub mod selection;
    pub use selection::SelectionSet;

    pub mod ui_state;
    pub use ui_state::{RedrawFlag, UIMode, UIState};
}

pub mod view {
    pub mod help;

    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod error_overlay;
        pub use error_overlay::ErrorOverlay;
        pub mod object_table;
        pub use object_table::EntryTable;
        pub mod selection_list;
        pub use selection_list::SelectionList;
        pub mod status_bar;
        pub use status_bar::StatusBar;
        pub mod tab_bar;
        pub use tab_bar::TabBar;
    }
}

pub mod fs {
    pub mod dir_scanner;
    pub mod object_info;
    pub mod utils;
}

pub mod tasks {
    pub mod edit_task;

    pub mod plugin_task;

    pub mod process_task;

    pub mod report_task;
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod humanize;
}

pub use error::AppError;

pub use model::{app_state::AppState, fs_state::FSState, ui_state::UIState};
