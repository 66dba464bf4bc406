// Import from the library instead of declaring modules
use forest_rs::{config::ForestConfig, debug, ui::ForestApp};

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), eframe::Error> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    debug::init();
    let config = ForestConfig::from_env();
    tracing::info!(
        width = config.width,
        height = config.height,
        species = config.number_species,
        policy = config.policy.name(),
        "starting forest"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 900.0])
            .with_title("Forest - Tree Competition Simulation"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Forest",
        options,
        Box::new(|cc| Ok(Box::new(ForestApp::new(cc, config)?))),
    );

    tracing::info!("shutting down");
    debug::print_stats();

    result
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;

    // Set up panic hook for better error messages in the browser
    console_error_panic_hook::set_once();

    debug::init();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("forest-canvas")
            .expect("Failed to find forest-canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("forest-canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(ForestApp::new(cc, ForestConfig::default())?))),
            )
            .await;

        if let Err(e) = start_result {
            panic!("Failed to start eframe: {e:?}");
        }
    });
}
