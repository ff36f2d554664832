//! Launch argument adaptation.

use regex::Regex;
use std::sync::LazyLock;

static TWEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--tweakClass ([a-zA-Z0-9.]+)").expect("static tweaker pattern"));

/// Game arguments the canonical format leaves to the launcher.
const DROPPED_GAME_ARGUMENTS: &[&str] = &["--clientId", "${clientid}", "--xuid", "${auth_xuid}"];

const STANDARD_ARGUMENTS: &str = "--username ${auth_player_name} --version ${version_name} \
     --gameDir ${game_directory} --assetsDir ${assets_root} --assetIndex ${assets_index_name} \
     --uuid ${auth_uuid} --accessToken ${auth_access_token} --userType ${user_type} \
     --versionType ${version_type}";

/// Split `--tweakClass <class>` pairs out of a legacy argument string.
///
/// Returns the tweaker classes in order of appearance and the remaining
/// arguments, or `None` for the remainder when nothing is left.
pub fn extract_tweakers(arguments: &str) -> (Vec<String>, Option<String>) {
    let mut rest = arguments.to_owned();
    let mut tweakers = Vec::new();
    while let Some((start, end, class)) = TWEAKER.captures(&rest).and_then(|caps| {
        let whole = caps.get(0)?;
        Some((whole.start(), whole.end(), caps.get(1)?.as_str().to_owned()))
    }) {
        tweakers.push(class);
        let before = rest[..start].trim();
        let after = rest[end..].trim();
        rest = match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_owned(),
            (_, true) => before.to_owned(),
            _ => format!("{before} {after}"),
        };
    }
    let rest = rest.trim();
    (tweakers, (!rest.is_empty()).then(|| rest.to_owned()))
}

/// Join new-style plain game arguments into a legacy argument string.
pub fn adapt_game_arguments<'a>(arguments: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let kept: Vec<&str> = arguments
        .into_iter()
        .filter(|a| !DROPPED_GAME_ARGUMENTS.contains(a))
        .collect();
    (!kept.is_empty()).then(|| kept.join(" "))
}

/// Launch arguments for an add-on started through the installer bridge.
pub fn build_system_arguments<'a>(
    game_arguments: impl IntoIterator<Item = &'a str>,
    addon_version: &str,
    base_version: &str,
) -> String {
    let mut args: Vec<String> = STANDARD_ARGUMENTS
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    args.extend(game_arguments.into_iter().map(str::to_owned));

    for (flag, value) in [
        ("--fml.forgeGroup", "net.minecraftforge"),
        ("--fml.forgeVersion", addon_version),
        ("--fml.mcVersion", base_version),
    ] {
        if !args.iter().any(|a| a == flag) {
            args.push(flag.to_owned());
            args.push(value.to_owned());
        }
    }
    args.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweakers_are_extracted_repeatedly() {
        let (tweakers, rest) = extract_tweakers(
            "--username ${auth_player_name} --tweakClass cpw.mods.fml.common.launcher.FMLTweaker --version ${version_name} --tweakClass optifine.OptiFineTweaker",
        );
        assert_eq!(
            tweakers,
            vec![
                "cpw.mods.fml.common.launcher.FMLTweaker",
                "optifine.OptiFineTweaker"
            ]
        );
        assert_eq!(
            rest.as_deref(),
            Some("--username ${auth_player_name} --version ${version_name}")
        );
    }

    #[test]
    fn nothing_left_yields_none() {
        let (tweakers, rest) =
            extract_tweakers("  --tweakClass net.minecraftforge.fml.common.launcher.FMLTweaker ");
        assert_eq!(tweakers.len(), 1);
        assert_eq!(rest, None);
        assert_eq!(extract_tweakers(""), (Vec::new(), None));
    }

    #[test]
    fn client_identity_arguments_are_dropped() {
        let adapted = adapt_game_arguments([
            "--username",
            "${auth_player_name}",
            "--clientId",
            "${clientid}",
            "--xuid",
            "${auth_xuid}",
            "--userType",
            "${user_type}",
        ]);
        assert_eq!(
            adapted.as_deref(),
            Some("--username ${auth_player_name} --userType ${user_type}")
        );
        assert_eq!(adapt_game_arguments([]), None);
    }

    #[test]
    fn build_system_appends_missing_fml_flags() {
        let args = build_system_arguments(
            ["--launchTarget", "fmlclient", "--fml.mcVersion", "1.16.5"],
            "36.2.39",
            "1.16.5",
        );
        assert!(args.starts_with("--username ${auth_player_name}"));
        assert!(args.contains("--launchTarget fmlclient"));
        assert!(args.ends_with("--fml.forgeGroup net.minecraftforge --fml.forgeVersion 36.2.39"));
        assert_eq!(args.matches("--fml.mcVersion").count(), 1);
    }
}
