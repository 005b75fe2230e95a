// tests/executable_resolver.rs

use std::error::Error;
use std::os::unix::fs::symlink;
use std::path::Path;

use filterchain::exec::resolve::PROCESS_PATH_VAR;
use filterchain::exec::{BundleLinkResolver, DirectResolver, ExecutableResolver};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn direct_resolver_is_identity() {
    let resolved = DirectResolver.resolve(Path::new("/usr/lib/cups/filter/pdftops"));
    assert_eq!(resolved.path, Path::new("/usr/lib/cups/filter/pdftops"));
    assert!(resolved.extra_env.is_empty());
}

#[test]
fn bundle_resolver_follows_absolute_link() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("Bundle.app/Contents/MacOS/pdftops");
    std::fs::create_dir_all(target.parent().unwrap())?;
    std::fs::write(&target, b"")?;
    let link = dir.path().join("pdftops");
    symlink(&target, &link)?;

    let resolved = BundleLinkResolver.resolve(&link);

    assert_eq!(resolved.path, link);
    assert_eq!(
        resolved.extra_env,
        vec![(PROCESS_PATH_VAR.to_string(), target.display().to_string())]
    );
    Ok(())
}

#[test]
fn bundle_resolver_joins_relative_link_to_its_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let link = dir.path().join("texttops");
    symlink("../Bundle.app/texttops", &link)?;

    let resolved = BundleLinkResolver.resolve(&link);

    assert_eq!(
        resolved.extra_env[0].1,
        dir.path().join("../Bundle.app/texttops").display().to_string()
    );
    Ok(())
}

#[test]
fn bundle_resolver_uses_plain_files_as_is() -> TestResult {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("rastertoepson");
    std::fs::write(&file, b"")?;

    let resolved = BundleLinkResolver.resolve(&file);

    assert_eq!(resolved.extra_env[0].0, "CFProcessPath");
    assert_eq!(resolved.extra_env[0].1, file.display().to_string());
    Ok(())
}
