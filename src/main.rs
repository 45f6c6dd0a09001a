mod app;
mod family;
mod layout;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to a family JSON file. When omitted, a synthetic demo tree is shown.
    #[arg(long)]
    file: Option<String>,

    /// Person id to use as the tree root instead of the file's declared root.
    #[arg(long)]
    root: Option<String>,

    /// Number of generations in the synthetic demo tree.
    #[arg(long, default_value_t = 7)]
    demo_generations: usize,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let source = match args.file {
        Some(path) => family::FamilySource::File {
            path,
            root_override: args.root,
        },
        None => family::FamilySource::Demo {
            generations: args.demo_generations.max(1),
        },
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "kindred",
        options,
        Box::new(move |cc| Ok(Box::new(app::KindredApp::new(cc, source)))),
    )
}
