//! Package identifiers and trait names of the canonical metadata tree.

pub const BASE_PACKAGE: &str = "net.minecraft";
pub const BASE_NAME: &str = "Minecraft";
pub const BASE_ORDER: i32 = -2;
/// Coordinate the base platform's client jar is published under.
pub const CLIENT_JAR_GROUP: &str = "com.mojang";
pub const CLIENT_JAR_ARTIFACT: &str = "minecraft";

pub const ADDON_PACKAGE: &str = "net.minecraftforge";
pub const ADDON_NAME: &str = "Forge";
pub const ADDON_ORDER: i32 = 5;

/// Second-generation windowing bindings.
pub const WINDOWING_GEN2_PACKAGE: &str = "org.lwjgl";
/// Third-generation windowing bindings.
pub const WINDOWING_GEN3_PACKAGE: &str = "org.lwjgl3";
pub const WINDOWING_ORDER: i32 = -1;

pub const TRAIT_FIRST_THREAD_MACOS: &str = "FirstThreadOnMacOS";
pub const TRAIT_LEGACY_FML: &str = "legacyFML";

/// Runtime package the runtime catalog is published under.
pub const RUNTIME_PACKAGE: &str = "net.minecraft.java";
