mod app;
mod decode;
mod display_cache;
mod error;
mod formats;
mod output;
mod pane;
mod pane_canvas;
mod scanner;
mod session;
mod settings;
mod viewport;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("multicompare=info"))
        .init();
    app::run()
}
