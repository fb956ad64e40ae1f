//! Image editing example - modifies an existing image with a text prompt.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png> "<instruction>"`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use lumina::{codec, download, EditClient, EditSession};

#[tokio::main]
async fn main() -> lumina::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: edit_image <input_image.png> [instruction]");
    let instruction = args
        .next()
        .unwrap_or_else(|| "Make the colors more vibrant and add a warm sunset glow".into());

    let client = EditClient::from_env()?;
    let mut session = EditSession::new();
    session.select_image(codec::encode_file(&input_path)?);
    session.set_prompt(instruction);
    session.generate(&client).await;

    let state = session.state();
    match (&state.generated_image, &state.error) {
        (Some(image), _) => {
            let path = download::save_to_dir(image, ".")?;
            println!("Edited image saved to {}", path.display());
        }
        (None, Some(error)) => eprintln!("{error}"),
        (None, None) => eprintln!("Nothing to do"),
    }

    Ok(())
}
