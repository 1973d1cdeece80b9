extern crate preload;

use preload::res::prelude::*;

#[test]
fn basic() {
    let locator = Locator::new("file:///usr/share/crate.png").unwrap();
    assert_eq!(locator.schema(), "file");
    assert_eq!(locator.path(), "/usr/share/crate.png");
    assert_eq!(locator.query(), None);
    assert_eq!(locator.fragment(), None);

    let locator = Locator::new("mem://crate.png?mip=0#atlas").unwrap();
    assert_eq!(locator.schema(), "mem");
    assert_eq!(locator.path(), "crate.png");
    assert_eq!(locator.query(), Some("mip=0"));
    assert_eq!(locator.fragment(), Some("atlas"));

    let locator = Locator::new("mem://crate.png#atlas").unwrap();
    assert_eq!(locator.path(), "crate.png");
    assert_eq!(locator.query(), None);
    assert_eq!(locator.fragment(), Some("atlas"));
}

#[test]
fn without_schema() {
    let locator = Locator::new("assets/crate.png").unwrap();
    assert_eq!(locator.schema(), "file");
    assert_eq!(locator.path(), "assets/crate.png");
    assert_eq!(locator.to_string(), "assets/crate.png");
}

#[test]
fn err() {
    assert!(Locator::new("").is_err());
    assert!(Locator::new("   ").is_err());
    assert!(Locator::new("://crate.png").is_err());
    assert!(Locator::new("mem://").is_err());
    assert!(Locator::new("mem://?mip=0").is_err());
}

#[test]
fn schemas() {
    let schemas = SchemaResolver::new();
    let memory = Memory::new();
    memory.insert("crate.png", vec![1, 2, 3]);
    schemas.add("mem", memory.clone());

    assert!(schemas.has("mem"));
    assert!(!schemas.has("file"));

    let locator = Locator::new("mem://crate.png").unwrap();
    assert_eq!(schemas.read(&locator).unwrap(), vec![1, 2, 3]);
    assert!(schemas.locate("mem").unwrap().exists(&locator));

    assert!(memory.remove("crate.png"));
    assert!(schemas.read(&locator).is_err());
    assert!(schemas.read(&Locator::new("file://crate.png").unwrap()).is_err());
}

#[test]
fn dir() {
    let root = std::env::temp_dir();
    let name = format!("preload-locator-{}.bin", std::process::id());
    std::fs::write(root.join(&name), b"bytes").unwrap();

    let dir = Dir::with_root(&root).unwrap();
    let locator = Locator::new(name.clone()).unwrap();
    assert!(dir.exists(&locator));
    assert_eq!(dir.read(&locator).unwrap(), b"bytes".to_vec());

    let absolute = Locator::new(format!("file://{}", root.join(&name).display())).unwrap();
    assert_eq!(Dir::new().read(&absolute).unwrap(), b"bytes".to_vec());

    std::fs::remove_file(root.join(&name)).unwrap();
    assert!(!dir.exists(&locator));
    assert!(dir.read(&locator).is_err());

    assert!(Dir::with_root(root.join(&name)).is_err());
}
