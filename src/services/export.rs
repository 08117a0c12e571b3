use printpdf::{
    image_crate, BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::models::{PokedexEntry, PokemonDetail, TeamWithMembers};

const CSV_HEADERS: [&str; 10] = [
    "id",
    "pokemon_id",
    "pokemon_name",
    "pokemon_sprite",
    "is_captured",
    "capture_date",
    "nickname",
    "notes",
    "favorite",
    "created_at",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize entries as `;`-delimited CSV with every field quoted and a BOM
pub fn pokedex_csv(entries: &[PokedexEntry]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(CSV_HEADERS).map_err(csv_error)?;

    for entry in entries {
        writer
            .write_record([
                entry.id.to_string(),
                entry.pokemon_id.to_string(),
                entry.pokemon_name.clone(),
                entry.pokemon_sprite.clone(),
                entry.is_captured.to_string(),
                entry.capture_date.map(rfc3339).transpose()?.unwrap_or_default(),
                entry.nickname.clone().unwrap_or_default(),
                entry.notes.clone().unwrap_or_default(),
                entry.favorite.to_string(),
                rfc3339(entry.created_at)?,
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

fn rfc3339(at: OffsetDateTime) -> AppResult<String> {
    at.format(&Rfc3339)
        .map_err(|e| AppError::Internal(format!("Date formatting failed: {}", e)))
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", err))
}

// A4 portrait
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;

/// Render a team sheet: name, description, then members in position order
pub fn team_pdf(team: &TeamWithMembers) -> AppResult<Vec<u8>> {
    let mut pdf = PdfWriter::new(&format!("Team {}", team.team.name))?;

    pdf.heading(&format!("Team: {}", team.team.name));
    if let Some(description) = team.team.description.as_deref().filter(|d| !d.is_empty()) {
        pdf.line(description);
    }
    pdf.gap();
    pdf.subheading("Members");

    if team.members.is_empty() {
        pdf.line("This team has no members yet.");
    }
    for member in &team.members {
        pdf.line(&format!(
            "{}. {} (#{})",
            member.position, member.pokemon_name, member.pokemon_id
        ));
    }

    pdf.finish()
}

/// Render a printable card for one Pokémon.
///
/// `sprite` holds the encoded image; a sprite that cannot be decoded is
/// left out of the card.
pub fn pokemon_card_pdf(detail: &PokemonDetail, sprite: Option<&[u8]>) -> AppResult<Vec<u8>> {
    let pokemon = &detail.pokemon;
    let mut pdf = PdfWriter::new(&format!("Pokemon card {}", pokemon.name))?;

    pdf.heading(&format!("#{} {}", pokemon.id, capitalize(&pokemon.name)));

    if let Some(bytes) = sprite {
        match image_crate::load_from_memory(bytes) {
            Ok(decoded) => pdf.image(Image::from_dynamic_image(&decoded), 60.0),
            Err(e) => tracing::warn!(pokemon = %pokemon.name, "Could not decode sprite: {}", e),
        }
    }

    pdf.line(&format!("Types: {}", pokemon.types.join(", ")));
    pdf.line(&format!("Abilities: {}", pokemon.abilities.join(", ")));
    pdf.gap();

    pdf.subheading("Base stats");
    for stat in &pokemon.stats {
        pdf.line(&format!("{}: {}", stat.name, stat.base));
    }

    if !detail.description.is_empty() {
        pdf.gap();
        pdf.subheading("Description");
        for chunk in wrap(&detail.description, 90) {
            pdf.line(&chunk);
        }
    }

    pdf.finish()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Greedy word wrap on character count
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Top-down text cursor that starts a new page when it reaches the margin
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn heading(&mut self, text: &str) {
        self.write(text, 18.0, true, LINE_HEIGHT * 1.6);
    }

    fn subheading(&mut self, text: &str) {
        self.write(text, 14.0, true, LINE_HEIGHT * 1.2);
    }

    fn line(&mut self, text: &str) {
        self.write(text, 11.0, false, LINE_HEIGHT);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }

    /// Place an image scaled to `height` millimetres at the cursor
    fn image(&mut self, image: Image, height: f32) {
        self.reserve(height);
        self.y -= height;

        let pixels = image.image.height.0.max(1) as f32;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(pixels * 25.4 / height),
                ..Default::default()
            },
        );
        self.gap();
    }

    fn write(&mut self, text: &str, size: f32, bold: bool, advance: f32) {
        self.reserve(advance);
        self.y -= advance;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn pdf_error(err: printpdf::Error) -> AppError {
    AppError::Internal(format!("PDF export failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pokemon, PokemonStat, Team, TeamMemberView};
    use time::macros::datetime;
    use uuid::Uuid;

    fn entry(pokemon_id: i32, name: &str, captured: bool) -> PokedexEntry {
        PokedexEntry {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            pokemon_id,
            pokemon_name: name.to_string(),
            pokemon_sprite: format!("https://img.test/{}.png", pokemon_id),
            is_captured: captured,
            capture_date: captured.then_some(datetime!(2024-03-01 10:00 UTC)),
            nickname: Some("Sparky; the \"fast\" one".to_string()),
            notes: None,
            favorite: false,
            created_at: datetime!(2024-03-01 09:00 UTC),
        }
    }

    fn team(members: usize) -> TeamWithMembers {
        TeamWithMembers {
            team: Team {
                id: Uuid::new_v4(),
                trainer_id: Uuid::new_v4(),
                name: "Kanto".to_string(),
                description: Some("Starters".to_string()),
                created_at: OffsetDateTime::now_utc(),
            },
            members: (0..members)
                .map(|i| TeamMemberView {
                    id: Uuid::new_v4(),
                    position: i as i32 + 1,
                    pokedex_entry_id: Uuid::new_v4(),
                    pokemon_id: i as i32 + 1,
                    pokemon_name: format!("pokemon-{}", i + 1),
                })
                .collect(),
        }
    }

    #[test]
    fn test_csv_layout() {
        let bytes = pokedex_csv(&[entry(25, "pikachu", true), entry(1, "bulbasaur", false)])
            .unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "\"id\";\"pokemon_id\";\"pokemon_name\";\"pokemon_sprite\";\"is_captured\";\
             \"capture_date\";\"nickname\";\"notes\";\"favorite\";\"created_at\""
        );
        assert!(lines[1].contains("\"25\";\"pikachu\""));
        assert!(lines[1].contains("\"2024-03-01T10:00:00Z\""));
        assert!(lines[1].contains("\"Sparky; the \"\"fast\"\" one\""));
        // Uncaptured: empty capture date, still quoted
        assert!(lines[2].contains("\"false\";\"\";"));
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let bytes = pokedex_csv(&[]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_team_pdf_renders() {
        let pdf = team_pdf(&team(6)).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let empty = team_pdf(&team(0)).unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }

    #[test]
    fn test_card_pdf_survives_bad_sprite() {
        let detail = PokemonDetail {
            pokemon: Pokemon {
                id: 25,
                name: "pikachu".to_string(),
                sprite: String::new(),
                types: vec!["electric".to_string()],
                stats: vec![PokemonStat {
                    name: "speed".to_string(),
                    base: 90,
                }],
                abilities: vec!["static".to_string()],
            },
            description: "It stores electricity in its cheeks.".to_string(),
        };

        let pdf = pokemon_card_pdf(&detail, Some(b"not an image")).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert!(wrap("", 10).is_empty());
        assert_eq!(capitalize("pikachu"), "Pikachu");
    }
}
