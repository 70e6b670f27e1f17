//! Generic classfile-specific definitions

/// Header of Java class file (magic number)
pub const MAGIC: u32 = 0xCAFEBABE;

/// Name of a constructor
pub const CONSTRUCTOR_METHOD_NAME: &str = "<init>";

/// Name of a static initializer
pub const STATIC_INITIALIZER_METHOD_NAME: &str = "<clinit>";

/// Root of every class hierarchy; the only class without a superclass
pub const OBJECT_CLASS_NAME: &str = "java/lang/Object";

/// JVM version constants
pub mod major_versions {
    pub const JAVA_1_1: u16 = 45;
    pub const JAVA_5_0: u16 = 49;
    pub const JAVA_6_0: u16 = 50;
    pub const JAVA_7: u16 = 51;
    pub const JAVA_8: u16 = 52;
    pub const JAVA_9: u16 = 53;
    pub const JAVA_11: u16 = 55;
    pub const JAVA_17: u16 = 61;
    pub const JAVA_21: u16 = 65;
}

/// Attribute names the stub pipeline reads, writes or deliberately skips
pub mod attribute_names {
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const SIGNATURE: &str = "Signature";
    pub const DEPRECATED: &str = "Deprecated";
    pub const SYNTHETIC: &str = "Synthetic";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const METHOD_PARAMETERS: &str = "MethodParameters";
    pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
    pub const INNER_CLASSES: &str = "InnerClasses";
    pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
    pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
    pub const RUNTIME_VISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeVisibleTypeAnnotations";
    pub const RUNTIME_INVISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeInvisibleTypeAnnotations";
    pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeVisibleParameterAnnotations";
    pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeInvisibleParameterAnnotations";

    pub const CODE: &str = "Code";
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";

    /// Executable or debug payload; never part of a stub
    pub const SKIPPED: &[&str] = &[
        CODE,
        SOURCE_FILE,
        "SourceDebugExtension",
        LINE_NUMBER_TABLE,
        "LocalVariableTable",
        "LocalVariableTypeTable",
        "StackMapTable",
        "BootstrapMethods",
        "NestHost",
        "NestMembers",
    ];

    /// ABI-relevant attributes the structural model has no representation for
    pub const UNSUPPORTED: &[&str] = &[
        "Module",
        "ModulePackages",
        "ModuleMainClass",
        "Record",
        "PermittedSubclasses",
    ];
}
