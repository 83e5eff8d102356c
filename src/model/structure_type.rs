//! Closed vocabulary of logical structure types.
//!
//! Codes follow the DFG structure data set used in METS exports of
//! digitized prints; each type carries the German label shown in outlines.

/// Label used when a type code is not part of the vocabulary.
pub const FALLBACK_LABEL: &str = "n.a.";

/// Macro for defining the structure type enum with its code and label tables.
///
/// Generates `code()`, `label()` and `from_code()` from a single listing so
/// that every variant is guaranteed to have both.
macro_rules! structure_types {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $variant:ident => $code:literal, $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            /// Every type, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// The METS `TYPE` code.
            #[inline]
            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)*
                }
            }

            /// Human-readable label.
            #[inline]
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }

            /// Parse a METS `TYPE` code.
            #[inline]
            pub fn from_code(s: &str) -> Option<Self> {
                match s {
                    $($code => Some($name::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

structure_types! {
    /// Logical structure type of a METS div.
    pub enum StructureType {
        Abstract => "abstract", "Zusammenfassung",
        Act => "act", "Akt",
        Additional => "additional", "Beilage",
        Address => "address", "Adresse",
        Advertising => "advertising", "Werbung",
        Album => "album", "Album",
        Annotation => "annotation", "Annotation",
        Appendix => "appendix", "Anhang",
        Article => "article", "Artikel",
        Atlas => "atlas", "Atlas",
        BachelorThesis => "bachelor_thesis", "Bachelorarbeit",
        Binding => "binding", "Einband",
        Bookplate => "bookplate", "Exlibris",
        Cartulary => "cartulary", "Kopiar",
        Chapter => "chapter", "Kapitel",
        Collation => "collation", "Kollation",
        Colophon => "colophon", "Kolophon",
        ContainedWork => "contained_work", "Enthaltenes Werk",
        Contents => "contents", "Inhaltsverzeichnis",
        Contract => "contract", "Vertrag",
        CorrigendaSheet => "corrigenda", "Corrigenda",
        CourtDecision => "court_decision", "Gerichtsentscheid",
        Cover => "cover", "Deckel",
        CoverBack => "cover_back", "Rückdeckel",
        CoverFront => "cover_front", "Vorderdeckel",
        CurriculumVitae => "curriculum_vitae", "Lebenslauf",
        Day => "day", "Tag",
        Dedication => "dedication", "Widmung",
        DiplomaThesis => "diploma_thesis", "Diplomarbeit",
        DoctoralThesis => "doctoral_thesis", "Dissertation",
        Document => "document", "Dokument",
        Dossier => "dossier", "Dossier",
        Edge => "edge", "Schnitt",
        Endsheet => "endsheet", "Vorsatz",
        EngravedTitlepage => "engraved_titlepage", "Kupfertitel",
        Entry => "entry", "Eintrag",
        Errata => "errata", "Errata",
        Fascicle => "fascicle", "Faszikel",
        Figure => "figure", "Abbildung",
        File => "file", "Akte",
        Folder => "folder", "Mappe",
        Fragment => "fragment", "Fragment",
        GroundPlan => "ground_plan", "Grundriss",
        HabilitationThesis => "habilitation_thesis", "Habilitation",
        Illustration => "illustration", "Illustration",
        Image => "image", "Bild",
        Imprint => "imprint", "Impressum",
        Index => "index", "Register",
        InitialDecoration => "initial_decoration", "Initialschmuck",
        Introduction => "introduction", "Einleitung",
        Inventory => "inventory", "Bestand",
        Issue => "issue", "Ausgabe",
        Judgement => "judgement", "Urteil",
        LandRegister => "land_register", "Grundbuch",
        Leaflet => "leaflet", "Flugblatt",
        Lecture => "lecture", "Vorlesung",
        Ledger => "ledger", "Kassenbuch",
        LegalComment => "legal_comment", "Rechtskommentar",
        LegalNorm => "legal_norm", "Rechtsnorm",
        Letter => "letter", "Brief",
        List => "list", "Liste",
        MagisterThesis => "magister_thesis", "Magisterarbeit",
        Manuscript => "manuscript", "Handschrift",
        Map => "map", "Karte",
        MasterThesis => "master_thesis", "Masterarbeit",
        Monograph => "monograph", "Monographie",
        Month => "month", "Monat",
        MultivolumeWork => "multivolume_work", "Mehrbändiges Werk",
        MusicalNotation => "musical_notation", "Musiknotation",
        Newspaper => "newspaper", "Zeitung",
        Note => "note", "Notiz",
        OfficialNotification => "official_notification", "Amtliche Bekanntmachung",
        Ornament => "ornament", "Ornament",
        Part => "part", "Teil",
        PasteDown => "paste_down", "Spiegel",
        Periodical => "periodical", "Periodikum",
        Photograph => "photograph", "Fotografie",
        Plan => "plan", "Plan",
        Poem => "poem", "Gedicht",
        Poster => "poster", "Plakat",
        Preface => "preface", "Vorwort",
        Preprint => "preprint", "Preprint",
        PrintersMark => "printers_mark", "Druckermarke",
        Privileges => "privileges", "Privilegien",
        Proceeding => "proceeding", "Tagungsband",
        Provenance => "provenance", "Provenienz",
        Register => "register", "Verzeichnis",
        Report => "report", "Bericht",
        ResearchPaper => "research_paper", "Forschungsarbeit",
        Review => "review", "Rezension",
        Scheme => "scheme", "Schema",
        Seal => "seal", "Siegel",
        Section => "section", "Abschnitt",
        Speech => "speech", "Rede",
        Spine => "spine", "Rücken",
        Stamp => "stamp", "Stempel",
        Statute => "statute", "Statut",
        Study => "study", "Studie",
        Subinventory => "subinventory", "Unterbestand",
        Table => "table", "Tabelle",
        TableOfContents => "table_of_contents", "Inhaltsverzeichnis",
        Text => "text", "Text",
        TitlePage => "title_page", "Titelblatt",
        Unit => "unit", "Einheit",
        Verse => "verse", "Vers",
        Volume => "volume", "Band",
        Year => "year", "Jahr",
    }
}

impl StructureType {
    /// Types describing a whole print (the unit a descriptive section is
    /// usually attached to). These never get per-page outline leaves.
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            StructureType::Monograph
                | StructureType::Volume
                | StructureType::Manuscript
                | StructureType::Issue
                | StructureType::Additional
                | StructureType::Atlas
                | StructureType::Album
                | StructureType::Fascicle
                | StructureType::File
                | StructureType::Dossier
                | StructureType::Document
                | StructureType::Leaflet
                | StructureType::Proceeding
                | StructureType::DoctoralThesis
                | StructureType::HabilitationThesis
                | StructureType::DiplomaThesis
                | StructureType::MagisterThesis
                | StructureType::MasterThesis
                | StructureType::BachelorThesis
        )
    }

    /// Newspaper hierarchy wrappers; these conventionally carry no structure
    /// link of their own.
    pub fn is_newspaper_container(&self) -> bool {
        matches!(
            self,
            StructureType::Newspaper
                | StructureType::Year
                | StructureType::Month
                | StructureType::Day
        )
    }

    /// Containers pointing at a parent record (multi-volume works, serials)
    /// rather than describing pages of this print.
    pub fn is_anchor(&self) -> bool {
        matches!(
            self,
            StructureType::MultivolumeWork | StructureType::Periodical
        )
    }
}

impl std::fmt::Display for StructureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Display label for a raw type code, or [`FALLBACK_LABEL`].
pub fn label_for_code(code: &str) -> &'static str {
    StructureType::from_code(code)
        .map(|t| t.label())
        .unwrap_or(FALLBACK_LABEL)
}
