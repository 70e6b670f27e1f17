// Global safety caps to prevent pathological input from looping forever

// Signature parser: maximum grammar steps per signature string
pub const SIGNATURE_MAX_ITERS: usize = 200_000;

// Element values: maximum nesting depth of annotation/array values
pub const ANNOTATION_MAX_DEPTH: usize = 64;

// Inner-class table: maximum enclosing-chain length followed when pruning
pub const INNER_CLASS_MAX_CHAIN: usize = 256;

// Well-known annotation types and their retention, used when the classpath lacks them
pub const PLATFORM_RUNTIME_ANNOTATIONS: &[&str] = &[
    "java/lang/Deprecated",
    "java/lang/FunctionalInterface",
    "java/lang/SafeVarargs",
    "java/lang/annotation/Documented",
    "java/lang/annotation/Inherited",
    "java/lang/annotation/Repeatable",
    "java/lang/annotation/Retention",
    "java/lang/annotation/Target",
];

pub const PLATFORM_SOURCE_ANNOTATIONS: &[&str] = &[
    "java/lang/Override",
    "java/lang/SuppressWarnings",
];
