use super::*;
use crate::foundation::core::has_temp_prefix;

#[test]
fn names_are_unique_and_prefixed() {
    let namer = TempNamer::new("/tmp/render");
    let a = namer.unique("Pre volume", "txt");
    let b = namer.unique("Pre volume", ".txt");
    assert_ne!(a, b);
    assert!(has_temp_prefix(&a));
    assert_eq!(a.parent(), Some(Path::new("/tmp/render")));
    let name = a.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.contains("Pre_volume_0_"), "{name}");
    assert!(name.ends_with(".txt"));
    assert!(b.to_string_lossy().ends_with(".txt"));
    assert!(!b.to_string_lossy().ends_with("..txt"));
}

#[test]
fn empty_stem_gets_placeholder() {
    assert_eq!(sanitize(""), "tmp");
    assert_eq!(sanitize("a/b c"), "a_b_c");
}
