#![no_main]

use std::convert::Infallible;

use bytes::Bytes;
use form_adapter::{FormAdapter, FormConfig};
use futures_util::stream::once;
use libfuzzer_sys::fuzz_target;
use tokio::runtime;

fuzz_target!(|data: &[u8]| {
    let data = data.to_vec();
    let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });

    let dir = std::env::temp_dir().join("form-adapter-fuzz");
    std::fs::create_dir_all(&dir).expect("upload dir");
    let adapter = FormAdapter::with_config(FormConfig::new().upload_dir(&dir).max_file_size(64 * 1024));

    let rt = runtime::Builder::new_current_thread().build().expect("runtime");
    rt.block_on(async {
        if let Ok(outcome) = adapter.parse_stream(stream, "X-BOUNDARY").await {
            for entry in outcome.files {
                let _ = tokio::fs::remove_file(entry.file.path()).await;
            }
        }
    })
});
