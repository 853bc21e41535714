use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, ID, Query};
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::font::{FontError, FontFace, GlyphSource, Result};

/// Outcome of resolving a family name.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub source: Arc<dyn GlyphSource>,
    /// Family that actually served the request.
    pub family: String,
    /// True when the requested family was unavailable and a fallback was used.
    pub substituted: bool,
}

/// Family-name resolution over a `fontdb` database plus faces registered
/// in memory.
///
/// Registered faces win over database faces with the same name. Resolutions
/// are memoized per lowercase family name until the library is mutated.
pub struct FontLibrary {
    db: Database,
    registered: Vec<(String, Arc<dyn GlyphSource>)>,
    loaded: HashMap<ID, Arc<dyn GlyphSource>>,
    resolved: HashMap<String, ResolvedFont>,
    fallback_family: Option<String>,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("database_faces", &self.db.len())
            .field("registered", &self.registered.len())
            .field("fallback_family", &self.fallback_family)
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    /// An empty library with no faces.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            registered: Vec::new(),
            loaded: HashMap::new(),
            resolved: HashMap::new(),
            fallback_family: None,
        }
    }

    /// A library populated with the host's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut library = Self::new();
        library.load_system_fonts();
        library
    }

    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        debug!(faces = self.db.len(), "loaded system fonts");
        self.invalidate();
    }

    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        self.db.load_fonts_dir(dir);
        self.invalidate();
    }

    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
        self.invalidate();
    }

    /// Register an in-memory face under `family`.
    pub fn register(&mut self, family: impl Into<String>, source: Arc<dyn GlyphSource>) {
        self.registered.push((family.into(), source));
        self.invalidate();
    }

    /// Family tried first when a requested family is unavailable.
    pub fn set_fallback_family(&mut self, family: Option<String>) {
        self.fallback_family = family;
        self.invalidate();
    }

    /// Number of faces known to the library.
    pub fn face_count(&self) -> usize {
        self.db.len() + self.registered.len()
    }

    /// Resolve `family` to a face, substituting a fallback when needed.
    ///
    /// Only fails when the library holds no usable face at all.
    pub fn resolve(&mut self, family: &str) -> Result<ResolvedFont> {
        let key = family.trim().to_ascii_lowercase();
        if let Some(hit) = self.resolved.get(&key) {
            return Ok(hit.clone());
        }

        let resolved = match self.lookup(family.trim()) {
            Some((name, source)) => ResolvedFont {
                source,
                family: name,
                substituted: false,
            },
            None => {
                let (name, source) = self
                    .fallback()
                    .ok_or_else(|| FontError::NoFallback(family.to_string()))?;
                debug!(requested = family, substitute = %name, "font family unavailable, using fallback");
                ResolvedFont {
                    source,
                    family: name,
                    substituted: true,
                }
            }
        };

        self.resolved.insert(key, resolved.clone());
        Ok(resolved)
    }

    fn invalidate(&mut self) {
        self.resolved.clear();
    }

    fn lookup(&mut self, family: &str) -> Option<(String, Arc<dyn GlyphSource>)> {
        if family.is_empty() {
            return None;
        }
        if let Some((name, source)) = self
            .registered
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(family))
        {
            return Some((name.clone(), source.clone()));
        }

        let id = match generic_family(family) {
            Some(generic) => self.db.query(&Query {
                families: &[generic],
                ..Query::default()
            })?,
            None => {
                let name = self.canonical_family(family)?;
                self.db.query(&Query {
                    families: &[Family::Name(&name)],
                    ..Query::default()
                })?
            }
        };
        self.load(id)
    }

    fn fallback(&mut self) -> Option<(String, Arc<dyn GlyphSource>)> {
        if let Some(name) = self.fallback_family.clone() {
            if let Some(found) = self.lookup(&name) {
                return Some(found);
            }
        }
        for generic in ["sans-serif", "serif", "monospace"] {
            if let Some(found) = self.lookup(generic) {
                return Some(found);
            }
        }
        if let Some((name, source)) = self.registered.first() {
            return Some((name.clone(), source.clone()));
        }
        let ids: Vec<ID> = self.db.faces().map(|info| info.id).collect();
        ids.into_iter().find_map(|id| self.load(id))
    }

    /// fontdb matches names case-sensitively; map user input onto the
    /// spelling the database uses.
    fn canonical_family(&self, family: &str) -> Option<String> {
        self.db
            .faces()
            .flat_map(|info| info.families.iter())
            .find(|(name, _)| name.eq_ignore_ascii_case(family))
            .map(|(name, _)| name.clone())
    }

    fn load(&mut self, id: ID) -> Option<(String, Arc<dyn GlyphSource>)> {
        let name = self
            .db
            .face(id)
            .and_then(|info| info.families.first())
            .map(|(name, _)| name.clone())
            .unwrap_or_default();

        if let Some(face) = self.loaded.get(&id) {
            return Some((name, face.clone()));
        }

        let parsed = self.db.with_face_data(id, |data, index| {
            FontFace::from_bytes(Arc::from(data), index as usize)
        })?;
        match parsed {
            Ok(face) => {
                let face: Arc<dyn GlyphSource> = Arc::new(face);
                self.loaded.insert(id, face.clone());
                Some((name, face))
            }
            Err(error) => {
                warn!(?error, family = %name, "skipping unreadable font face");
                None
            }
        }
    }
}

fn generic_family(name: &str) -> Option<Family<'static>> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" => Some(Family::SansSerif),
        "serif" => Some(Family::Serif),
        "monospace" => Some(Family::Monospace),
        "cursive" => Some(Family::Cursive),
        "fantasy" => Some(Family::Fantasy),
        _ => None,
    }
}
