//! Showcase viewer: loads a scene document and an HDR environment, plays
//! the intro, then hands control to the orbit interaction.
//!
//! Usage: `viewer [scene.json] [environment.hdr]`

use vitrine::App;

fn main() -> vitrine::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let scene = args.next().unwrap_or_else(|| "assets/scene.json".to_string());
    let hdr = args.next().unwrap_or_else(|| "assets/studio.hdr".to_string());

    App::new("vitrine", scene, hdr).run()
}
