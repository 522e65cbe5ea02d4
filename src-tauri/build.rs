fn main() {
    tauri_build::try_build(tauri_build::Attributes::new().app_manifest(
        tauri_build::AppManifest::new().commands(&["send_new_message", "popup_ready", "close_popup"]),
    ))
    .expect("failed to run tauri-build");
}
