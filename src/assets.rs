//! MSIX logo asset set and placeholder generation.
//!
//! `init` scaffolds the five logo PNGs a valid package needs, as transparent
//! placeholders with the correct pixel dimensions. Existing files are left
//! alone so user-provided artwork survives a re-run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

/// One required logo image.
#[derive(Debug, Clone, Copy)]
pub struct MsixAsset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// The asset files the manifest references.
pub const MSIX_ASSETS: &[MsixAsset] = &[
    MsixAsset { name: "StoreLogo.png", width: 50, height: 50 },
    MsixAsset { name: "Square44x44Logo.png", width: 44, height: 44 },
    MsixAsset { name: "Square150x150Logo.png", width: 150, height: 150 },
    MsixAsset { name: "Wide310x150Logo.png", width: 310, height: 150 },
    MsixAsset { name: "LargeTile.png", width: 310, height: 310 },
];

/// Write placeholder PNGs for every asset missing under `dir/Assets`.
pub fn generate_assets(dir: &Path) -> Result<()> {
    let assets_dir = dir.join("Assets");
    fs::create_dir_all(&assets_dir)
        .with_context(|| format!("creating '{}'", assets_dir.display()))?;

    for asset in MSIX_ASSETS {
        let path = assets_dir.join(asset.name);
        if path.exists() {
            continue;
        }
        // Fully transparent placeholder at the required dimensions.
        let placeholder = RgbaImage::new(asset.width, asset.height);
        placeholder
            .save(&path)
            .with_context(|| format!("writing placeholder '{}'", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn asset_table_contains_the_required_logos() {
        let names: Vec<&str> = MSIX_ASSETS.iter().map(|a| a.name).collect();
        assert!(names.contains(&"StoreLogo.png"));
        assert!(names.contains(&"Square44x44Logo.png"));
        assert!(names.contains(&"Square150x150Logo.png"));
        assert!(names.contains(&"Wide310x150Logo.png"));
        assert!(names.contains(&"LargeTile.png"));
    }

    #[test]
    fn generates_every_asset_as_valid_png() {
        let temp = TempDir::new().unwrap();
        generate_assets(temp.path()).unwrap();

        for asset in MSIX_ASSETS {
            let path = temp.path().join("Assets").join(asset.name);
            assert!(path.is_file(), "{} should exist", asset.name);

            let (width, height) = image::image_dimensions(&path).unwrap();
            assert_eq!((width, height), (asset.width, asset.height), "{}", asset.name);
        }
    }

    #[test]
    fn existing_assets_are_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let assets_dir = temp.path().join("Assets");
        fs::create_dir_all(&assets_dir).unwrap();
        fs::write(assets_dir.join("StoreLogo.png"), "user artwork").unwrap();

        generate_assets(temp.path()).unwrap();

        let content = fs::read_to_string(assets_dir.join("StoreLogo.png")).unwrap();
        assert_eq!(content, "user artwork");
        assert!(assets_dir.join("LargeTile.png").is_file());
    }
}
