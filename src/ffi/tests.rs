use super::*;
use crate::composing::ComposingSnapshot;
use crate::engine::{
    CancelToken, Candidate, ConversionEngine, ConversionResult, ConvertRequestOptions,
    EngineError,
};
use proptest::prelude::*;
use std::ffi::{c_int, CStr, CString};
use std::ptr;
use std::sync::Barrier;
use std::thread;

const DICT_TSV: &str = "\
か\t0\t0\t3000\t課
か\t0\t0\t3500\t蚊
かんじ\t0\t0\t3000\t漢字
かんじ\t0\t0\t3200\t感じ
せいど\t0\t0\t3000\t制度
せいど\t0\t0\t3200\t精度
";

fn write_dict(dir: &tempfile::TempDir) -> CString {
    let path = dir.path().join("dict.tsv");
    std::fs::write(&path, DICT_TSV).unwrap();
    CString::new(path.to_str().unwrap()).unwrap()
}

/// Run a request and copy the records out, freeing the list.
fn request(
    conv: KkcConverterHandle,
    buf: KkcComposingTextHandle,
    dict: &CStr,
    weight: &CStr,
) -> (Vec<(String, c_int)>, KkcStatus) {
    let mut len: c_int = -1;
    let list = kkc_converter_request_candidates(
        conv,
        buf,
        &mut len,
        c"".as_ptr(),
        dict.as_ptr(),
        weight.as_ptr(),
    );
    let status = kkc_last_status();
    assert!(len >= 0);
    if len == 0 {
        assert!(list.is_null());
    }
    let mut out = Vec::new();
    unsafe {
        for i in 0..len as usize {
            let record = &**list.add(i);
            let text = CStr::from_ptr(record.text).to_str().unwrap().to_string();
            out.push((text, record.corresponding_count));
        }
    }
    kkc_candidates_free(list, len);
    (out, status)
}

fn insert(buf: KkcComposingTextHandle, text: &str) {
    let text = CString::new(text).unwrap();
    kkc_composing_text_insert_at_cursor(buf, text.as_ptr());
}

fn convert_target(buf: KkcComposingTextHandle) -> Option<String> {
    let ptr = kkc_composing_text_convert_target(buf);
    if ptr.is_null() {
        return None;
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    kkc_string_free(ptr);
    Some(s)
}

fn units(buf: KkcComposingTextHandle) -> usize {
    COMPOSING_TEXTS.with(buf.0, |ct| ct.len()).unwrap()
}

// ---------------------------------------------------------------------------
// Basic conversion
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_ka_yields_ranked_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    assert!(!conv.is_null());
    assert!(!buf.is_null());

    insert(buf, "ka");
    let (candidates, status) = request(conv, buf, &dict, c"");
    assert_eq!(status, KkcStatus::Ok);
    assert!(!candidates.is_empty());
    assert_eq!(candidates[0].0, "課");
    assert!(candidates[0].1 as usize <= units(buf));
    assert!(candidates.iter().any(|(text, _)| text == "か"));

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_counts_within_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();

    insert(buf, "kanjiseido");
    let n = units(buf) as c_int;
    let (candidates, _) = request(conv, buf, &dict, c"");
    assert_eq!(candidates[0].0, "漢字制度");
    assert!(candidates.iter().all(|(_, count)| *count >= 1 && *count <= n));
    // Prefix candidate consuming only かんじ
    assert!(candidates.contains(&("漢字".to_string(), 3)));

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_empty_buffer_is_ok_and_empty() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();

    let (candidates, status) = request(conv, buf, &dict, c"");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::Ok);
    assert!(kkc_last_error_message().is_null());

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_weight_file_reorders() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let weight_path = dir.path().join("weights.toml");
    std::fs::write(&weight_path, "[bias]\n\"精度\" = -1000\n").unwrap();
    let weight = CString::new(weight_path.to_str().unwrap()).unwrap();

    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "seido");

    let (plain, _) = request(conv, buf, &dict, c"");
    assert_eq!(plain[0].0, "制度");
    let (weighted, status) = request(conv, buf, &dict, &weight);
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(weighted[0].0, "精度");

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_keystrokes_not_offered_as_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "seido");

    let (candidates, status) = request(conv, buf, &dict, c"");
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(candidates[0].0, "制度");
    assert!(candidates.iter().all(|(text, _)| text != "seido"));

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_extreme_weights_keep_converter_alive() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let weight_path = dir.path().join("extreme.toml");
    std::fs::write(
        &weight_path,
        format!(
            "[model]\nlength_weight = {}\n\n[bias]\n\"課\" = {}\n",
            i64::MAX,
            i64::MIN
        ),
    )
    .unwrap();
    let weight = CString::new(weight_path.to_str().unwrap()).unwrap();

    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let (weighted, status) = request(conv, buf, &dict, &weight);
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(weighted[0], ("課".to_string(), 1));

    let (plain, status) = request(conv, buf, &dict, c"");
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(plain[0].0, "課");

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_missing_dictionary() {
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "kanji");

    let (candidates, status) = request(conv, buf, c"/nonexistent/kkc/dict.tsv", c"");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::ResourceUnavailable);
    let msg = unsafe { CStr::from_ptr(kkc_last_error_message()) };
    assert!(msg.to_str().unwrap().contains("/nonexistent/kkc/dict.tsv"));

    // Converter stays usable afterwards
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let (candidates, status) = request(conv, buf, &dict, c"");
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(candidates[0].0, "漢字");

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_missing_weight_file() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let (candidates, status) = request(conv, buf, &dict, c"/nonexistent/kkc/weights.toml");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::ResourceUnavailable);

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_null_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let list = kkc_converter_request_candidates(
        conv,
        buf,
        ptr::null_mut(),
        ptr::null(),
        dict.as_ptr(),
        ptr::null(),
    );
    assert!(list.is_null());
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);

    let mut len: c_int = 7;
    let list = kkc_converter_request_candidates(
        conv,
        buf,
        &mut len,
        ptr::null(),
        ptr::null(),
        ptr::null(),
    );
    assert!(list.is_null());
    assert_eq!(len, 0);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);

    // Null context and weight read as empty
    let list = kkc_converter_request_candidates(
        conv,
        buf,
        &mut len,
        ptr::null(),
        dict.as_ptr(),
        ptr::null(),
    );
    assert!(len > 0);
    assert_eq!(kkc_last_status(), KkcStatus::Ok);
    kkc_candidates_free(list, len);

    kkc_composing_text_insert_at_cursor(buf, ptr::null());
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);
    assert_eq!(convert_target(buf).as_deref(), Some("か"));

    kkc_candidates_free(ptr::null_mut(), 0);
    kkc_string_free(ptr::null_mut());

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_invalid_utf8_argument() {
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    let bad = [0xffu8, 0xfe, 0];
    kkc_composing_text_insert_at_cursor(buf, bad.as_ptr().cast());
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);
    assert_eq!(units(buf), 0);

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

// ---------------------------------------------------------------------------
// Handle lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_destroyed_buffer_yields_no_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "ka");
    kkc_composing_text_destroy(buf);

    let (candidates, status) = request(conv, buf, &dict, c"");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::InvalidHandle);

    // Edits on the dead handle are ignored too
    insert(buf, "ka");
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);
    assert_eq!(kkc_composing_text_cursor(buf), -1);
    assert_eq!(kkc_composing_text_move_cursor(buf, 1), -1);
    assert!(convert_target(buf).is_none());

    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_destroyed_converter_yields_no_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);
    let conv = kkc_converter_create();
    let buf = kkc_composing_text_create();
    insert(buf, "ka");
    kkc_converter_destroy(conv);

    let (candidates, status) = request(conv, buf, &dict, c"");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::InvalidHandle);

    kkc_converter_stop_composition(conv, buf);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);

    kkc_composing_text_destroy(buf);
}

#[test]
fn test_ffi_double_destroy() {
    let conv = kkc_converter_create();
    kkc_converter_destroy(conv);
    assert_eq!(kkc_last_status(), KkcStatus::Ok);
    kkc_converter_destroy(conv);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);
    let msg = unsafe { CStr::from_ptr(kkc_last_error_message()) };
    assert!(msg.to_str().unwrap().contains("stale"));

    let buf = kkc_composing_text_create();
    kkc_composing_text_destroy(buf);
    kkc_composing_text_destroy(buf);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);

    kkc_converter_destroy(KkcConverterHandle::NULL);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);
    kkc_composing_text_destroy(KkcComposingTextHandle(0xdead_beef));
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);
}

#[test]
fn test_ffi_create_destroy_releases_converter() {
    let conv = kkc_converter_create();
    let weak = Arc::downgrade(&CONVERTERS.get(conv.0).unwrap());
    kkc_converter_destroy(conv);
    // Registry held the only strong reference; its drop joined the worker
    assert!(weak.upgrade().is_none());
    assert!(!CONVERTERS.contains(conv.0));
}

// ---------------------------------------------------------------------------
// Composing buffer through the ABI
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_composing_edits() {
    let buf = kkc_composing_text_create();
    insert(buf, "k");
    insert(buf, "a");
    insert(buf, "nji");
    assert_eq!(convert_target(buf).as_deref(), Some("かんじ"));
    assert_eq!(kkc_composing_text_cursor(buf), 3);

    kkc_composing_text_delete_backward(buf, 1);
    assert_eq!(convert_target(buf).as_deref(), Some("かん"));
    assert_eq!(kkc_composing_text_cursor(buf), 2);

    assert_eq!(kkc_composing_text_move_cursor(buf, -2), 0);
    kkc_composing_text_delete_forward(buf, 1);
    assert_eq!(convert_target(buf).as_deref(), Some("ん"));
    assert_eq!(kkc_composing_text_cursor(buf), 0);

    kkc_composing_text_delete_forward(buf, -5);
    kkc_composing_text_delete_backward(buf, 0);
    assert_eq!(convert_target(buf).as_deref(), Some("ん"));
    assert_eq!(kkc_last_status(), KkcStatus::Ok);

    kkc_composing_text_destroy(buf);
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(String),
    DeleteForward(i32),
    DeleteBackward(i32),
    MoveCursor(i32),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => "[a-z]{1,4}".prop_map(Edit::Insert),
        1 => prop::sample::select(vec!["あ", "ー", "1", "、"])
            .prop_map(|s| Edit::Insert(s.to_string())),
        2 => any::<i32>().prop_map(Edit::DeleteForward),
        2 => (-3i32..6).prop_map(Edit::DeleteBackward),
        1 => any::<i32>().prop_map(Edit::DeleteBackward),
        2 => (-4i32..4).prop_map(Edit::MoveCursor),
    ]
}

fn state(buf: KkcComposingTextHandle) -> (usize, usize) {
    COMPOSING_TEXTS
        .with(buf.0, |ct| (ct.len(), ct.cursor()))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn buffer_edits_clamp(edits in prop::collection::vec(arb_edit(), 1..60)) {
        let buf = kkc_composing_text_create();
        for edit in &edits {
            let (len, cursor) = state(buf);
            match edit {
                Edit::Insert(text) => insert(buf, text),
                Edit::DeleteForward(count) => {
                    kkc_composing_text_delete_forward(buf, *count);
                    let expected = if *count > 0 { (*count as usize).min(len - cursor) } else { 0 };
                    prop_assert_eq!(state(buf), (len - expected, cursor));
                }
                Edit::DeleteBackward(count) => {
                    kkc_composing_text_delete_backward(buf, *count);
                    let expected = if *count > 0 { (*count as usize).min(cursor) } else { 0 };
                    prop_assert_eq!(state(buf), (len - expected, cursor - expected));
                }
                Edit::MoveCursor(offset) => {
                    let moved = kkc_composing_text_move_cursor(buf, *offset);
                    prop_assert!(moved >= 0);
                    prop_assert_eq!(moved as usize, state(buf).1);
                }
            }
            prop_assert_eq!(kkc_last_status(), KkcStatus::Ok);
            let (len, cursor) = state(buf);
            prop_assert!(cursor <= len);
        }
        kkc_composing_text_destroy(buf);
    }
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_independent_pairs_on_threads() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_dict(&dir);

    let inputs = [("kanji", "漢字", "かんじ"), ("seido", "制度", "せいど"), ("ka", "課", "か")];
    thread::scope(|s| {
        for (romaji, best, kana) in inputs {
            let dict = &dict;
            s.spawn(move || {
                let conv = kkc_converter_create();
                let buf = kkc_composing_text_create();
                for _ in 0..20 {
                    insert(buf, romaji);
                    assert_eq!(convert_target(buf).as_deref(), Some(kana));
                    let (candidates, status) = request(conv, buf, dict, c"");
                    assert_eq!(status, KkcStatus::Ok);
                    assert_eq!(candidates[0].0, best);
                    kkc_composing_text_delete_backward(buf, i32::MAX);
                }
                kkc_composing_text_destroy(buf);
                kkc_converter_destroy(conv);
            });
        }
    });
}

/// Engine that blocks its first job on a barrier twice: once to signal that
/// the job started, once to wait for the test to act.
struct GatedEngine {
    gate: Option<Arc<Barrier>>,
}

impl ConversionEngine for GatedEngine {
    fn request_candidates(
        &mut self,
        input: &ComposingSnapshot,
        _options: &ConvertRequestOptions,
        cancel: &CancelToken,
    ) -> Result<ConversionResult, EngineError> {
        if let Some(gate) = self.gate.take() {
            gate.wait();
            gate.wait();
        }
        if cancel.is_cancelled() {
            return Ok(ConversionResult::default());
        }
        Ok(ConversionResult {
            main_results: vec![Candidate {
                text: input.full_reading(),
                corresponding_count: input.len(),
                cost: 0,
            }],
        })
    }
}

fn gated_converter(gate: &Arc<Barrier>) -> KkcConverterHandle {
    let engine = GatedEngine {
        gate: Some(Arc::clone(gate)),
    };
    let converter = crate::converter::Converter::with_engine(Box::new(engine)).unwrap();
    KkcConverterHandle(CONVERTERS.insert(Arc::new(converter)))
}

/// Start a request on another thread; the result is the record count and
/// the status seen by that thread.
fn spawn_request(
    conv: KkcConverterHandle,
    buf: KkcComposingTextHandle,
) -> thread::JoinHandle<(usize, KkcStatus)> {
    thread::spawn(move || {
        let (candidates, status) = request(conv, buf, c"/unused/dict.tsv", c"");
        (candidates.len(), status)
    })
}

#[test]
fn test_ffi_stop_during_request() {
    let gate = Arc::new(Barrier::new(2));
    let conv = gated_converter(&gate);
    let buf = kkc_composing_text_create();
    insert(buf, "kana");

    let requester = spawn_request(conv, buf);
    gate.wait(); // engine is running the job
    kkc_converter_stop_composition(conv, buf);
    assert_eq!(kkc_last_status(), KkcStatus::Ok);
    gate.wait();
    assert_eq!(requester.join().unwrap(), (0, KkcStatus::Ok));

    // Still usable, and later requests are not cancelled
    let (candidates, status) = request(conv, buf, c"/unused/dict.tsv", c"");
    assert_eq!(status, KkcStatus::Ok);
    assert_eq!(candidates, vec![("かな".to_string(), 2)]);

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

#[test]
fn test_ffi_destroy_converter_during_request() {
    let gate = Arc::new(Barrier::new(2));
    let conv = gated_converter(&gate);
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let requester = spawn_request(conv, buf);
    gate.wait();
    kkc_converter_destroy(conv);
    assert_eq!(kkc_last_status(), KkcStatus::Ok);
    gate.wait();
    assert_eq!(requester.join().unwrap(), (0, KkcStatus::InvalidHandle));
    assert!(!CONVERTERS.contains(conv.0));

    kkc_composing_text_destroy(buf);
}

#[test]
fn test_ffi_destroy_buffer_during_request() {
    let gate = Arc::new(Barrier::new(2));
    let conv = gated_converter(&gate);
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let requester = spawn_request(conv, buf);
    gate.wait();
    kkc_composing_text_destroy(buf);
    gate.wait();
    assert_eq!(requester.join().unwrap(), (0, KkcStatus::InvalidHandle));

    kkc_converter_destroy(conv);
}

/// Engine that panics on every job.
struct PanickingEngine;

impl ConversionEngine for PanickingEngine {
    fn request_candidates(
        &mut self,
        _input: &ComposingSnapshot,
        _options: &ConvertRequestOptions,
        _cancel: &CancelToken,
    ) -> Result<ConversionResult, EngineError> {
        panic!("engine bug");
    }
}

#[test]
fn test_ffi_dead_worker_reports_engine_unavailable() {
    let converter = crate::converter::Converter::with_engine(Box::new(PanickingEngine)).unwrap();
    let conv = KkcConverterHandle(CONVERTERS.insert(Arc::new(converter)));
    let buf = kkc_composing_text_create();
    insert(buf, "ka");

    let (candidates, status) = request(conv, buf, c"/unused/dict.tsv", c"");
    assert!(candidates.is_empty());
    assert_eq!(status, KkcStatus::EngineUnavailable);

    kkc_composing_text_destroy(buf);
    kkc_converter_destroy(conv);
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn test_ffi_version() {
    let v = unsafe { CStr::from_ptr(kkc_bridge_version()) };
    assert_eq!(v.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_ffi_default_configs() {
    let ptr = kkc_settings_default_config();
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    kkc_string_free(ptr);
    assert!(text.contains("[candidates]"));

    let ptr = kkc_romaji_default_config();
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    kkc_string_free(ptr);
    assert!(text.contains("[mappings]"));
}

#[test]
fn test_ffi_load_config_errors() {
    assert_eq!(kkc_settings_load_config(ptr::null()), -1);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);

    assert_eq!(kkc_settings_load_config(c"/nonexistent/kkc/settings.toml".as_ptr()), -1);
    assert_eq!(kkc_last_status(), KkcStatus::ResourceUnavailable);

    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[candidates]\nmax_results = \"many\"\n").unwrap();
    let bad = CString::new(bad.to_str().unwrap()).unwrap();
    assert_eq!(kkc_settings_load_config(bad.as_ptr()), -1);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);
    assert_eq!(kkc_romaji_load_config(bad.as_ptr()), -1);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);
}

#[test]
fn test_ffi_trace_init_null_is_noop() {
    kkc_trace_init(ptr::null());
    assert_eq!(kkc_last_status(), KkcStatus::InvalidArgument);
}

#[test]
fn test_ffi_panic_is_contained() {
    let value = boundary("test", 7, || -> i32 { panic!("boom") });
    assert_eq!(value, 7);
    assert_eq!(kkc_last_status(), KkcStatus::Internal);
    let msg = unsafe { CStr::from_ptr(kkc_last_error_message()) };
    assert!(msg.to_str().unwrap().contains("boom"));
}

#[test]
fn test_ffi_statuses_are_per_thread() {
    kkc_converter_destroy(KkcConverterHandle::NULL);
    assert_eq!(kkc_last_status(), KkcStatus::InvalidHandle);
    let other = thread::spawn(|| kkc_last_status()).join().unwrap();
    assert_eq!(other, KkcStatus::Ok);
}
