//! Symbols the semantic front end consults beyond the element being stubbed
//!
//! Holds what an element alone cannot tell: whether a referenced type is
//! nested (and in what), and the retention of annotation interfaces. Symbols
//! come from the elements of the current compilation and from class files on
//! the compile classpath.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::classfile::annotation::read_annotations;
use crate::classfile::class::ClassFile;
use crate::classfile::defs::attribute_names::{INNER_CLASSES, RUNTIME_VISIBLE_ANNOTATIONS};
use crate::classfile::error::ClassFileResult;
use crate::classfile::flag::{access_flags, has};
use crate::classfile::reader::ClassReader;
use crate::common::classpath::ClasspathResolver;
use crate::common::consts::{PLATFORM_RUNTIME_ANNOTATIONS, PLATFORM_SOURCE_ANNOTATIONS};
use crate::common::error::{Error, Result};
use crate::model::AnnotationValue;

use super::element::{internal_name, ElementKind, ElementValue, NestingKind, TypeElement, TypeMirror};
use super::semantic::inner_class_flags;

const RETENTION_TYPE: &str = "java/lang/annotation/Retention";

/// Annotation retention policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Source,
    Class,
    Runtime,
}

impl Retention {
    fn from_constant(name: &str) -> Option<Self> {
        match name {
            "SOURCE" => Some(Retention::Source),
            "CLASS" => Some(Retention::Class),
            "RUNTIME" => Some(Retention::Runtime),
            _ => None,
        }
    }
}

/// What is known about one type, keyed by internal name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    pub name: String,
    pub kind: ElementKind,
    /// Directly enclosing type of a member type
    pub outer: Option<String>,
    pub simple_name: Option<String>,
    /// Flags of the type's `InnerClasses` row
    pub inner_access_flags: u16,
    /// Set for annotation interfaces only
    pub retention: Option<Retention>,
}

impl TypeSymbol {
    pub fn top_level(name: impl Into<String>, kind: ElementKind) -> Self {
        let name = name.into();
        let simple_name = name.rsplit('/').next().map(str::to_string);
        Self { name, kind, outer: None, simple_name, inner_access_flags: 0, retention: None }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ResolutionContext {
    symbols: HashMap<String, TypeSymbol>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that knows the retention of the platform's own annotations
    pub fn with_platform_defaults() -> Self {
        let mut context = Self::new();
        let platform = PLATFORM_RUNTIME_ANNOTATIONS
            .iter()
            .map(|name| (name, Retention::Runtime))
            .chain(PLATFORM_SOURCE_ANNOTATIONS.iter().map(|name| (name, Retention::Source)));
        for (name, retention) in platform {
            let mut symbol = TypeSymbol::top_level(*name, ElementKind::Annotation);
            symbol.retention = Some(retention);
            context.insert(symbol);
        }
        context
    }

    /// Load every class on `entries`: directories are walked, jars and zips are
    /// read entry by entry. Classes that fail to parse are skipped with a warning.
    pub fn from_classpath(entries: &[PathBuf]) -> Result<Self> {
        let mut context = Self::with_platform_defaults();
        for entry in entries {
            if entry.is_dir() {
                context.load_directory(entry)?;
            } else if entry.is_file() {
                context.load_archive(entry)?;
            } else {
                log::warn!("classpath entry {} does not exist", entry.display());
            }
        }
        log::info!("loaded {} classpath symbols", context.len());
        Ok(context)
    }

    /// Load the classpath given as an argument, falling back to `CLASSPATH`
    pub fn from_classpath_arg(cp_arg: Option<&str>) -> Result<Self> {
        let classpath = ClasspathResolver::resolve_classpath(cp_arg);
        Self::from_classpath(&ClasspathResolver::parse_classpath_entries(&classpath))
    }

    fn load_directory(&mut self, dir: &Path) -> Result<()> {
        for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "class") {
                let bytes = fs::read(path)?;
                self.add_class_bytes_lenient(&path.display().to_string(), &bytes);
            }
        }
        Ok(())
    }

    fn load_archive(&mut self, path: &Path) -> Result<()> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() || !entry.name().ends_with(".class") {
                continue;
            }
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            let origin = format!("{}!{}", path.display(), entry.name());
            self.add_class_bytes_lenient(&origin, &bytes);
        }
        Ok(())
    }

    fn add_class_bytes_lenient(&mut self, origin: &str, bytes: &[u8]) {
        if let Err(err) = self.add_class_file(bytes) {
            log::warn!("skipping unreadable classpath class {}: {}", origin, err);
        }
    }

    pub fn insert(&mut self, symbol: TypeSymbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    pub fn get(&self, internal_name: &str) -> Option<&TypeSymbol> {
        self.symbols.get(internal_name)
    }

    pub fn contains(&self, internal_name: &str) -> bool {
        self.symbols.contains_key(internal_name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn retention(&self, internal_name: &str) -> Option<Retention> {
        self.get(internal_name).and_then(|symbol| symbol.retention)
    }

    /// Outer classes of `internal_name`, innermost first
    pub fn enclosing_chain(&self, internal_name: &str) -> Vec<&TypeSymbol> {
        let mut chain = Vec::new();
        let mut current = self.get(internal_name).and_then(|symbol| symbol.outer.as_deref());
        while let Some(outer) = current {
            match self.get(outer) {
                Some(symbol) if !chain.iter().any(|seen: &&TypeSymbol| seen.name == symbol.name) => {
                    chain.push(symbol);
                    current = symbol.outer.as_deref();
                }
                _ => break,
            }
        }
        chain
    }

    /// Register a source element and its member types
    pub fn add_element(&mut self, element: &TypeElement) {
        let outer = match element.nesting {
            NestingKind::Member => element.enclosing_type.as_deref().map(internal_name),
            _ => None,
        };
        let retention = match element.kind {
            ElementKind::Annotation => Some(element_retention(element)),
            _ => None,
        };
        self.insert(TypeSymbol {
            name: element.internal_name(),
            kind: element.kind,
            outer,
            simple_name: element.simple_name.clone(),
            inner_access_flags: inner_class_flags(element),
            retention,
        });
        for member in &element.member_types {
            self.add_element(member);
        }
    }

    /// Register a compiled class. `InnerClasses` rows also register the
    /// nesting of the other types they name, unless those are already known.
    pub fn add_class_file(&mut self, bytes: &[u8]) -> Result<()> {
        let class_file = ClassFile::parse(bytes).map_err(|err| Error::from_class_file("<classpath>", err))?;
        let pool = &class_file.constant_pool;
        let name = pool
            .class_name(class_file.this_class)
            .map_err(|err| Error::from_class_file("<classpath>", err))?
            .to_string();
        let symbol = self.read_symbol(&class_file, &name).map_err(|err| Error::from_class_file(&name, err))?;
        self.insert(symbol);
        Ok(())
    }

    fn read_symbol(&mut self, class_file: &ClassFile, name: &str) -> ClassFileResult<TypeSymbol> {
        let pool = &class_file.constant_pool;
        let flags = class_file.access_flags;
        let kind = if has(flags, access_flags::ACC_ANNOTATION) {
            ElementKind::Annotation
        } else if has(flags, access_flags::ACC_INTERFACE) {
            ElementKind::Interface
        } else if has(flags, access_flags::ACC_ENUM) {
            ElementKind::Enum
        } else {
            ElementKind::Class
        };
        let mut symbol = TypeSymbol::top_level(name, kind);

        for attribute in &class_file.attributes {
            match attribute.name(pool)? {
                INNER_CLASSES => {
                    let mut reader = ClassReader::new(&attribute.info);
                    for _ in 0..reader.read_u2()? {
                        let inner = pool.class_name(reader.read_u2()?)?;
                        let outer = pool.optional_class_name(reader.read_u2()?)?;
                        let simple = pool.optional_utf8(reader.read_u2()?)?;
                        let inner_flags = reader.read_u2()?;
                        let (Some(outer), Some(simple)) = (outer, simple) else {
                            continue;
                        };
                        if inner == name {
                            symbol.outer = Some(outer.to_string());
                            symbol.simple_name = Some(simple.to_string());
                            symbol.inner_access_flags = inner_flags;
                        } else if !self.contains(inner) {
                            let mut nested = TypeSymbol::top_level(inner, kind_of_inner(inner_flags));
                            nested.outer = Some(outer.to_string());
                            nested.simple_name = Some(simple.to_string());
                            nested.inner_access_flags = inner_flags;
                            self.insert(nested);
                        }
                    }
                }
                RUNTIME_VISIBLE_ANNOTATIONS if kind == ElementKind::Annotation => {
                    let mut reader = ClassReader::new(&attribute.info);
                    let meta = read_annotations(&mut reader, pool)?;
                    symbol.retention = meta
                        .iter()
                        .find(|annotation| annotation.type_descriptor == format!("L{};", RETENTION_TYPE))
                        .and_then(|annotation| annotation.values.iter().find(|(key, _)| key == "value"))
                        .and_then(|(_, value)| match value {
                            AnnotationValue::Enum { name, .. } => Retention::from_constant(name),
                            _ => None,
                        });
                }
                _ => {}
            }
        }

        if kind == ElementKind::Annotation && symbol.retention.is_none() {
            symbol.retention = Some(Retention::Class);
        }
        Ok(symbol)
    }
}

fn kind_of_inner(flags: u16) -> ElementKind {
    if has(flags, access_flags::ACC_ANNOTATION) {
        ElementKind::Annotation
    } else if has(flags, access_flags::ACC_INTERFACE) {
        ElementKind::Interface
    } else if has(flags, access_flags::ACC_ENUM) {
        ElementKind::Enum
    } else {
        ElementKind::Class
    }
}

/// `@Retention` of an annotation interface declared in source; `CLASS` when absent
fn element_retention(element: &TypeElement) -> Retention {
    element
        .annotations
        .iter()
        .filter(|mirror| {
            matches!(&mirror.annotation_type, TypeMirror::Declared { name, .. } if internal_name(name) == RETENTION_TYPE)
        })
        .flat_map(|mirror| mirror.values.iter())
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("value", ElementValue::Enum { name, .. }) => Retention::from_constant(name),
            _ => None,
        })
        .unwrap_or(Retention::Class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::attribute::AttributeInfo;
    use crate::classfile::writer::ClassfileWritable;
    use crate::frontend::element::{AnnotationMirror, Modifier};

    #[test]
    fn platform_defaults_know_core_retention() {
        let context = ResolutionContext::with_platform_defaults();
        assert_eq!(context.retention("java/lang/Deprecated"), Some(Retention::Runtime));
        assert_eq!(context.retention("java/lang/Override"), Some(Retention::Source));
        assert_eq!(context.retention("com/example/Unknown"), None);
    }

    #[test]
    fn elements_register_member_types_and_retention() {
        let mut outer = TypeElement::new("p.Outer", ElementKind::Class, vec![Modifier::Public]);
        let mut marker = TypeElement::new("p.Outer$Marker", ElementKind::Annotation, vec![Modifier::Public])
            .nested_in("p.Outer");
        marker.annotations.push(AnnotationMirror::new(TypeMirror::class("java.lang.annotation.Retention")).with_value(
            "value",
            ElementValue::Enum {
                enum_type: TypeMirror::class("java.lang.annotation.RetentionPolicy"),
                name: "RUNTIME".into(),
            },
        ));
        outer.member_types.push(marker);

        let mut context = ResolutionContext::new();
        context.add_element(&outer);

        let symbol = context.get("p/Outer$Marker").unwrap();
        assert_eq!(symbol.outer.as_deref(), Some("p/Outer"));
        assert_eq!(symbol.retention, Some(Retention::Runtime));
        assert!(has(symbol.inner_access_flags, access_flags::ACC_ANNOTATION));
        assert_eq!(context.enclosing_chain("p/Outer$Marker").len(), 1);
    }

    #[test]
    fn class_files_register_nesting_from_inner_classes_rows() {
        let mut class_file = ClassFile::new();
        let pool = &mut class_file.constant_pool;
        class_file.this_class = pool.add_class("p/Outer").unwrap();
        class_file.super_class = pool.add_class("java/lang/Object").unwrap();
        let inner = pool.add_class("p/Outer$Inner").unwrap();
        let outer = class_file.this_class;
        let simple = pool.add_utf8("Inner").unwrap();
        let mut info = Vec::new();
        for value in [1u16, inner, outer, simple, access_flags::ACC_PUBLIC | access_flags::ACC_STATIC] {
            info.extend_from_slice(&value.to_be_bytes());
        }
        let attribute = AttributeInfo::named(pool, INNER_CLASSES, info).unwrap();
        class_file.attributes.push(attribute);
        class_file.access_flags = access_flags::ACC_PUBLIC | access_flags::ACC_SUPER;

        let mut context = ResolutionContext::new();
        context.add_class_file(&class_file.to_classfile_bytes()).unwrap();

        assert_eq!(context.get("p/Outer").unwrap().kind, ElementKind::Class);
        let nested = context.get("p/Outer$Inner").unwrap();
        assert_eq!(nested.outer.as_deref(), Some("p/Outer"));
        assert_eq!(nested.simple_name.as_deref(), Some("Inner"));
    }

    #[test]
    fn broken_class_file_is_an_error() {
        let mut context = ResolutionContext::new();
        assert!(context.add_class_file(&[0xCA, 0xFE]).is_err());
        assert!(context.is_empty());
    }
}
