//! Loading themes from `themerc` resource files.
//!
//! A [`ThemeLoader`] finds a theme by name in the configured search
//! paths, parses its resource database, and resolves every field of a
//! [`Theme`] from it. Fields the theme does not set fall back to other
//! fields or to built-in defaults, following the rules in [`ids`].
//!
//! [`ids`]: super::ids

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use strum::*;
use tracing::{debug, info, warn};
#[cfg(debug_assertions)]
use tracing::instrument;

use super::defaults::{self, BULLET, BULLET_HEIGHT, BULLET_WIDTH, BUTTON_GLYPH_SIZE, ICON_SIZE};
use super::ids::{
    appearance_order, color_order, mask_order, AppearanceId, ColorFallback, ColorId, MaskFallback,
    MaskId, MenuTextKind, SurfaceFallback,
};
use super::parse::{parse_font, parse_justify, parse_style};
use super::resource::ThemeDb;
use super::{Dimensions, Fonts, Theme};
use crate::config::ThemeConfig;
use crate::render::{
    Appearance, Color, Font, FontDescription, Gradient, Image, ImageLayer, Justify, MaskLayer,
    PixmapMask, RenderInstance, Rgb, Surface, TextLayer, TextureLayer,
};
use crate::x::XConn;
use crate::{RenderError, Result};

const BLACK: Rgb = (0, 0, 0);

/// Where a loader is in its life.
#[derive(AsRefStr, Display, EnumIs, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(serialize_all = "lowercase")]
pub enum LoaderState {
    /// Nothing has been loaded, or the last load failed.
    #[default]
    Unloaded,
    /// A theme file has been parsed and is being resolved.
    Loading,
    /// A theme has been fully resolved.
    Populated,
    /// The parsed theme file has been released.
    Closed,
}

/// Fonts supplied by the caller in place of the theme's own.
///
/// The theme keeps a handle to each font given here; the caller's
/// handles stay valid after the theme is destroyed.
#[derive(Debug, Clone, Default)]
pub struct FontOverrides {
    /// Titles of focused windows.
    pub active: Option<Font>,
    /// Titles of unfocused windows.
    pub inactive: Option<Font>,
    /// Menu titles.
    pub menu_title: Option<Font>,
    /// Menu items.
    pub menu_item: Option<Font>,
    /// On-screen displays.
    pub osd: Option<Font>,
}

/// Finds, parses and resolves themes.
#[derive(Debug)]
pub struct ThemeLoader {
    config: ThemeConfig,
    state: LoaderState,
    db: Option<ThemeDb>,
    dir: Option<PathBuf>,
    name: Option<String>,
}

impl ThemeLoader {
    /// Creates a loader searching the paths in `config`.
    pub fn new(config: ThemeConfig) -> Self {
        Self {
            config,
            state: LoaderState::Unloaded,
            db: None,
            dir: None,
            name: None,
        }
    }

    /// The loader's configuration.
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    /// The current state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// The name of the theme last opened.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Loads the theme `name`, or the default theme if `name` is `None`.
    ///
    /// If the theme cannot be found or read, the default theme is
    /// loaded instead. An error is only returned if that fails too.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "theme", level = "debug", skip(self, inst, fonts))
    )]
    pub fn load<X: XConn>(
        &mut self,
        inst: &RenderInstance<X>,
        name: Option<&str>,
        fonts: &FontOverrides,
    ) -> Result<Theme> {
        let default = self.config.default_theme().to_string();
        let requested = name.unwrap_or(&default);

        if let Err(e) = self.open(requested) {
            if requested == default {
                self.state = LoaderState::Unloaded;
                return Err(e);
            }
            warn!("{}, falling back to {}", e, default);
            if let Err(e) = self.open(&default) {
                self.state = LoaderState::Unloaded;
                return Err(e);
            }
        }
        self.populate(inst, fonts)
    }

    /// Loads a theme from the contents of a resource file.
    ///
    /// Bitmaps are looked up in `dir` if given, then in the search paths.
    pub fn load_from_data<X: XConn>(
        &mut self,
        inst: &RenderInstance<X>,
        name: &str,
        data: &[u8],
        dir: Option<&Path>,
        fonts: &FontOverrides,
    ) -> Result<Theme> {
        self.db = Some(match dir {
            Some(dir) => ThemeDb::from_data_in(data, dir),
            None => ThemeDb::from_data(data),
        });
        self.dir = dir.map(Path::to_path_buf);
        self.name = Some(name.to_string());
        self.state = LoaderState::Loading;
        self.populate(inst, fonts)
    }

    /// Releases the parsed theme file.
    ///
    /// Themes already loaded are unaffected.
    pub fn close(&mut self) {
        self.db = None;
        self.state = LoaderState::Closed;
    }

    fn open(&mut self, name: &str) -> Result<()> {
        for file in self.config.theme_files(name) {
            if !file.is_file() {
                continue;
            }
            let data = fs::read(&file)
                .map_err(|e| RenderError::ThemeLoad(format!("{}: {}", file.display(), e)))?;
            let dir = file.parent().map(Path::to_path_buf);

            self.db = Some(match &dir {
                Some(dir) => ThemeDb::from_data_in(&data, dir),
                None => ThemeDb::from_data(&data),
            });
            self.dir = dir;
            self.name = Some(name.to_string());
            self.state = LoaderState::Loading;
            info!("reading theme {} from {}", name, file.display());
            return Ok(());
        }
        Err(RenderError::ThemeLoad(format!("theme {} not found", name)))
    }

    fn populate<X: XConn>(&mut self, inst: &RenderInstance<X>, fonts: &FontOverrides) -> Result<Theme> {
        let db = self
            .db
            .as_ref()
            .ok_or_else(|| RenderError::ThemeLoad("no theme file open".into()))?;

        let mut search: Vec<PathBuf> = self.dir.iter().cloned().collect();
        search.extend(self.config.search_paths().iter().cloned());

        let name = self.name.clone().unwrap_or_default();
        match Builder::new(inst, db, search).build(fonts, name, self.dir.clone()) {
            Ok(theme) => {
                self.state = LoaderState::Populated;
                debug!("theme {} has {} appearances", theme.name(), theme.appearances.len());
                Ok(theme)
            }
            Err(e) => {
                self.state = LoaderState::Unloaded;
                Err(e)
            }
        }
    }
}

/// Resolves every field of a theme, keeping what it has allocated so
/// far so that a failed load can give it all back.
struct Builder<'a, X: XConn> {
    inst: &'a RenderInstance<X>,
    db: &'a ThemeDb,
    search: Vec<PathBuf>,
    opened: HashMap<FontDescription, Font>,
    fonts: Option<Fonts>,
    colors: HashMap<ColorId, Color>,
    masks: HashMap<MaskId, Rc<PixmapMask>>,
    appearances: IndexMap<AppearanceId, Appearance>,
}

impl<'a, X: XConn> Builder<'a, X> {
    fn new(inst: &'a RenderInstance<X>, db: &'a ThemeDb, search: Vec<PathBuf>) -> Self {
        Self {
            inst,
            db,
            search,
            opened: HashMap::new(),
            fonts: None,
            colors: HashMap::new(),
            masks: HashMap::new(),
            appearances: IndexMap::new(),
        }
    }

    fn build(mut self, overrides: &FontOverrides, name: String, dir: Option<PathBuf>) -> Result<Theme> {
        match self.resolve(overrides) {
            Ok((dims, title_justify, menu_title_justify, default_icon)) => {
                self.opened.clear();
                let fonts = self
                    .fonts
                    .take()
                    .ok_or_else(|| RenderError::ThemeLoad("fonts were not resolved".into()))?;
                let parents = self
                    .appearances
                    .keys()
                    .filter_map(|id| id.default_parent().map(|p| (*id, p)))
                    .collect();

                Ok(Theme {
                    name,
                    dir,
                    fonts,
                    dims,
                    title_justify,
                    menu_title_justify,
                    colors: std::mem::take(&mut self.colors),
                    masks: std::mem::take(&mut self.masks),
                    appearances: std::mem::take(&mut self.appearances)
                        .into_iter()
                        .map(|(id, app)| (id, RefCell::new(app)))
                        .collect(),
                    parents,
                    default_icon,
                })
            }
            Err(e) => {
                self.discard();
                Err(e)
            }
        }
    }

    fn resolve(&mut self, overrides: &FontOverrides) -> Result<(Dimensions, Justify, Justify, Image)> {
        let fonts = self.resolve_fonts(overrides)?;
        self.fonts = Some(fonts.clone());
        self.resolve_colors()?;
        self.resolve_masks()?;

        let title_justify = parse_justify(self.db.string("window.label.text.justify"));
        let menu_title_justify = parse_justify(self.db.string("menu.title.text.justify"));
        let icon = self.default_icon()?;

        for id in appearance_order() {
            let surface = self.surface_for(id)?;
            let mut app = Appearance::new(surface, 0);
            app.texture = self.texture_for(id, &fonts, title_justify, menu_title_justify, &icon)?;
            self.appearances.insert(id, app);
        }

        let dims = self.dimensions(&fonts);
        Ok((dims, title_justify, menu_title_justify, icon))
    }

    /// Gives back everything allocated so far.
    fn discard(mut self) {
        let inst = self.inst;
        let mut freed = Ok(());
        for (_, app) in self.appearances.drain(..) {
            freed = freed.and(app.free(inst));
        }
        for (_, mask) in self.masks.drain() {
            if let Ok(mask) = Rc::try_unwrap(mask) {
                freed = freed.and(mask.free(inst));
            }
        }
        for (_, color) in self.colors.drain() {
            freed = freed.and(inst.release_color(color));
        }
        if let Some(fonts) = self.fonts.take() {
            freed = freed.and(fonts.close(inst));
        }
        for (_, font) in self.opened.drain() {
            freed = freed.and(font.close(inst));
        }
        if let Err(e) = freed {
            warn!("error releasing a partly loaded theme: {}", e);
        }
    }

    //* fonts

    fn open_font(&mut self, key: &str, given: &Option<Font>) -> Result<Font> {
        if let Some(font) = given {
            return Ok(font.clone());
        }
        let desc = match self.db.string(key) {
            Some(value) => parse_font(value, &FontDescription::default()),
            None => FontDescription::default(),
        };
        if let Some(font) = self.opened.get(&desc) {
            return Ok(font.clone());
        }
        let font = Font::open(self.inst, &desc)?;
        self.opened.insert(desc, font.clone());
        Ok(font)
    }

    fn resolve_fonts(&mut self, overrides: &FontOverrides) -> Result<Fonts> {
        Ok(Fonts {
            active: self.open_font("window.active.label.text.font", &overrides.active)?,
            inactive: self.open_font("window.inactive.label.text.font", &overrides.inactive)?,
            menu_title: self.open_font("menu.title.text.font", &overrides.menu_title)?,
            menu_item: self.open_font("menu.items.font", &overrides.menu_item)?,
            osd: self.open_font("osd.label.text.font", &overrides.osd)?,
        })
    }

    //* colors

    /// The first of `keys` holding a usable color.
    fn read_color<S: AsRef<str>>(&self, keys: &[S]) -> Option<Color> {
        for key in keys {
            let key = key.as_ref();
            let Some(value) = self.db.string(key) else {
                continue;
            };
            match self.inst.parse_color(value) {
                Ok(color) => return Some(color),
                Err(e) => warn!("{}: {}", key, e),
            }
        }
        None
    }

    /// Allocates a built-in color, settling for black if it is unavailable.
    fn literal(&self, (r, g, b): Rgb) -> Result<Color> {
        match self.inst.acquire_color(r, g, b) {
            Ok(color) => Ok(color),
            Err(e) if (r, g, b) != BLACK => {
                warn!("{}, using black", e);
                self.inst.acquire_color(0, 0, 0)
            }
            Err(e) => Err(e),
        }
    }

    fn resolve_colors(&mut self) -> Result<()> {
        for id in color_order() {
            let color = match self.read_color(&id.keys()) {
                Some(color) => color,
                None => match id.fallback() {
                    ColorFallback::Inherit(dep) => match self.colors.get(&dep) {
                        Some(color) => color.clone(),
                        None => self.literal(BLACK)?,
                    },
                    ColorFallback::Literal(rgb) => self.literal(rgb)?,
                },
            };
            self.colors.insert(id, color);
        }
        Ok(())
    }

    fn color(&self, id: ColorId) -> Result<Color> {
        self.colors
            .get(&id)
            .cloned()
            .ok_or_else(|| RenderError::ThemeLoad(format!("color {:?} was not resolved", id)))
    }

    //* masks

    fn load_mask(&self, file: &str) -> Option<PixmapMask> {
        for dir in &self.search {
            let path = dir.join(file);
            if !path.is_file() {
                continue;
            }
            match PixmapMask::load(self.inst, &path) {
                Ok(mask) => return Some(mask),
                Err(e) => warn!("{}", e),
            }
        }
        None
    }

    fn builtin_mask(&self, id: MaskId) -> Result<PixmapMask> {
        match id {
            MaskId::Button(kind, look) => PixmapMask::new(
                self.inst,
                BUTTON_GLYPH_SIZE,
                BUTTON_GLYPH_SIZE,
                defaults::button_bits(kind, look.is_toggled()),
            ),
            MaskId::Bullet => PixmapMask::new(self.inst, BULLET_WIDTH, BULLET_HEIGHT, &BULLET),
        }
    }

    fn resolve_masks(&mut self) -> Result<()> {
        for id in mask_order() {
            let mask = match self.load_mask(&id.file_name()) {
                Some(mask) => mask,
                None => match id.fallback() {
                    MaskFallback::Copy(dep) => match self.masks.get(&dep) {
                        Some(mask) => mask.copy(self.inst)?,
                        None => self.builtin_mask(id)?,
                    },
                    MaskFallback::Builtin => self.builtin_mask(id)?,
                },
            };
            self.masks.insert(id, Rc::new(mask));
        }
        Ok(())
    }

    fn mask(&self, id: MaskId) -> Result<Rc<PixmapMask>> {
        self.masks
            .get(&id)
            .cloned()
            .ok_or_else(|| RenderError::ThemeLoad(format!("mask {:?} was not resolved", id)))
    }

    //* surfaces

    /// The color at `key`, or black.
    fn surface_color(&self, key: String) -> Result<Color> {
        match self.read_color(&[key]) {
            Some(color) => Ok(color),
            None => self.literal(BLACK),
        }
    }

    /// Reads the surface of `id` from the theme, if it is there.
    fn read_surface(&self, id: AppearanceId) -> Result<Option<Surface>> {
        let Some((base, text)) = id
            .keys()
            .into_iter()
            .find_map(|key| self.db.string(&key).map(|text| (key, text)))
        else {
            return Ok(None);
        };

        let mut style = parse_style(text);
        if style.grad.is_parent_relative() && !id.allows_parent_relative() {
            warn!("{} may not be parentrelative, using solid", base);
            style.grad = Gradient::Solid;
        }

        let mut surface = Surface {
            grad: style.grad,
            relief: style.relief,
            bevel: style.bevel,
            border: style.border,
            interlaced: style.interlaced,
            ..Surface::default()
        };
        if !style.grad.is_parent_relative() {
            surface.primary = Some(self.surface_color(format!("{}.color", base))?);
            surface.secondary = Some(self.surface_color(format!("{}.colorTo", base))?);
            surface.split_primary = self.read_color(&[format!("{}.color.splitTo", base)]);
            surface.split_secondary = self.read_color(&[format!("{}.colorTo.splitTo", base)]);
        }
        if style.border {
            surface.border_color = Some(self.surface_color(format!("{}.border.color", base))?);
        }
        if style.interlaced {
            surface.interlace_color = Some(self.surface_color(format!("{}.interlace.color", base))?);
        }
        surface.bevel_light_adjust = self
            .db
            .int(&format!("{}.highlight", base), 0, 256)
            .map(|v| v as u16);
        surface.bevel_dark_adjust = self
            .db
            .int(&format!("{}.shadow", base), 0, 256)
            .map(|v| v as u16);

        trace!("{} is {:?}", base, style);
        Ok(Some(surface))
    }

    /// A flat black surface.
    fn default_surface(&self) -> Result<Surface> {
        Ok(Surface {
            primary: Some(self.literal(BLACK)?),
            secondary: Some(self.literal(BLACK)?),
            ..Surface::default()
        })
    }

    fn copy_surface(&self, id: AppearanceId) -> Result<Surface> {
        self.appearances
            .get(&id)
            .ok_or_else(|| RenderError::ThemeLoad(format!("appearance {:?} was not resolved", id)))?
            .surface
            .copy(self.inst)
    }

    fn surface_for(&self, id: AppearanceId) -> Result<Surface> {
        let fallback = id.fallback();
        if fallback == SurfaceFallback::ParentRelative {
            return Ok(Surface {
                grad: Gradient::ParentRelative,
                ..Surface::default()
            });
        }
        if let Some(surface) = self.read_surface(id)? {
            return Ok(surface);
        }
        match fallback {
            SurfaceFallback::Copy(dep) => {
                // highlighted osd elements cannot see through, so use
                // the title when the label is parentrelative
                let dep = match (id, dep) {
                    (AppearanceId::OsdHilight, AppearanceId::Label { focused })
                    | (AppearanceId::OsdUnhilight, AppearanceId::Label { focused })
                        if self.label_is_parent_relative(focused) =>
                    {
                        AppearanceId::Title { focused }
                    }
                    _ => dep,
                };
                self.copy_surface(dep)
            }
            _ => self.default_surface(),
        }
    }

    fn label_is_parent_relative(&self, focused: bool) -> bool {
        self.appearances
            .get(&AppearanceId::Label { focused })
            .is_some_and(|app| app.surface.grad.is_parent_relative())
    }

    //* textures

    fn text(&self, font: &Font, color: ColorId, justify: Justify) -> Result<Vec<TextureLayer>> {
        Ok(vec![TextureLayer::Text(TextLayer {
            font: font.clone(),
            justify,
            color: self.color(color)?,
            shadow: font.description().text_shadow(),
            string: String::new(),
        })])
    }

    fn glyph(&self, color: ColorId, mask: MaskId) -> Result<Vec<TextureLayer>> {
        Ok(vec![TextureLayer::Mask(MaskLayer {
            color: self.color(color)?,
            mask: self.mask(mask)?,
        })])
    }

    fn texture_for(
        &self,
        id: AppearanceId,
        fonts: &Fonts,
        title_justify: Justify,
        menu_title_justify: Justify,
        icon: &Image,
    ) -> Result<Vec<TextureLayer>> {
        use AppearanceId::*;

        match id {
            Label { focused } => {
                let font = if focused { &fonts.active } else { &fonts.inactive };
                self.text(font, ColorId::LabelText { focused }, title_justify)
            }
            Button { kind, focused, look } => {
                self.glyph(ColorId::ButtonImage { kind, focused, look }, MaskId::Button(kind, look))
            }
            MenuText(kind) => {
                let (font, color, justify) = match kind {
                    MenuTextKind::Title => (&fonts.menu_title, ColorId::MenuTitleText, menu_title_justify),
                    MenuTextKind::Normal => (&fonts.menu_item, ColorId::MenuItemText, Justify::Left),
                    MenuTextKind::Selected => {
                        (&fonts.menu_item, ColorId::MenuItemActiveText, Justify::Left)
                    }
                    MenuTextKind::Disabled => {
                        (&fonts.menu_item, ColorId::MenuItemDisabledText, Justify::Left)
                    }
                    MenuTextKind::DisabledSelected => (
                        &fonts.menu_item,
                        ColorId::MenuItemActiveDisabledText,
                        Justify::Left,
                    ),
                };
                self.text(font, color, justify)
            }
            MenuBullet { selected } => {
                let color = if selected {
                    ColorId::MenuBulletSelected
                } else {
                    ColorId::MenuBullet
                };
                self.glyph(color, MaskId::Bullet)
            }
            OsdLabel => self.text(&fonts.osd, ColorId::OsdText, Justify::Left),
            ClearText => self.text(&fonts.active, ColorId::LabelText { focused: true }, title_justify),
            Icon => Ok(vec![TextureLayer::Image(ImageLayer {
                image: icon.clone(),
                alpha: 0xff,
            })]),
            _ => Ok(Vec::new()),
        }
    }

    /// The default icon, shared with any live image of the same content.
    fn default_icon(&self) -> Result<Image> {
        let data = defaults::default_icon();
        let cache = self.inst.image_cache();
        if let Some(image) = cache.find(&data, ICON_SIZE, ICON_SIZE) {
            return Ok(image);
        }
        let image = cache.new_image();
        image.add_picture(&data, ICON_SIZE, ICON_SIZE)?;
        Ok(image)
    }

    //* dimensions

    fn vertical_margins(&self, id: AppearanceId) -> i32 {
        self.appearances
            .get(&id)
            .map(|app| {
                let (_, top, _, bottom) = app.margins();
                top + bottom
            })
            .unwrap_or(0)
    }

    fn dimensions(&self, fonts: &Fonts) -> Dimensions {
        let int = |key: &str, min: i32, max: i32, default: i32| self.db.int(key, min, max).unwrap_or(default);

        let padding_x = int("padding.width", 0, 100, 3);
        let padding_y = int("padding.height", 0, 100, padding_x);
        let border_width = int("border.width", 0, 100, 1);
        let overlap = int("menu.overlap", -100, 100, 0);

        let win_font_height = fonts.active.height().max(fonts.inactive.height());
        let label_margins = self
            .vertical_margins(AppearanceId::Label { focused: true })
            .max(self.vertical_margins(AppearanceId::Label { focused: false }));
        let mut label_height = win_font_height + label_margins;
        if label_height % 2 == 1 {
            label_height += 1;
        }
        let button_size = (label_height - 2).max(1);

        let menu_title_font_height = fonts.menu_title.height();
        let menu_title_label_height = menu_title_font_height
            + self.vertical_margins(AppearanceId::MenuText(MenuTextKind::Title));

        Dimensions {
            padding_x,
            padding_y,
            handle_height: int("window.handle.width", 0, 100, 6),
            border_width,
            menu_border_width: int("menu.border.width", 0, 100, border_width),
            osd_border_width: int("osd.border.width", 0, 100, border_width),
            client_padding_x: int("window.client.padding.width", 0, 100, padding_x),
            client_padding_y: int("window.client.padding.height", 0, 100, padding_y),
            menu_overlap_x: int("menu.overlap.x", -100, 100, overlap),
            menu_overlap_y: int("menu.overlap.y", -100, 100, overlap),
            menu_sep_width: int("menu.separator.width", 1, 100, 1),
            menu_sep_padding_x: int("menu.separator.padding.width", 0, 100, 6),
            menu_sep_padding_y: int("menu.separator.padding.height", 0, 100, 3),

            win_font_height,
            label_height,
            title_height: label_height + 2 * padding_y,
            button_size,
            grip_width: 2 * button_size,
            menu_title_font_height,
            menu_title_label_height,
            menu_title_height: menu_title_label_height + 2 * padding_y,
            menu_font_height: fonts.menu_item.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::no_checks;
    use crate::render::{Bevel, Relief};
    use crate::theme::{ButtonKind, ButtonLook, ButtonState};
    use crate::x::dummy::DummyConn;
    use crate::x::Xid;
    use std::path::Path;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;
    use test_log::test;

    const THEMERC: &str = "\
window.active.title.bg: raised gradient vertical
window.active.title.bg.color: #336699
window.active.title.bg.colorTo: #112233
window.inactive.title.bg: flat solid
window.inactive.title.bg.color: #cccccc
window.active.label.bg: parentrelative
window.inactive.label.bg: parentrelative
window.active.button.unpressed.bg: raised gradient vertical bevel2
window.active.button.unpressed.bg.color: #336699
window.active.button.unpressed.bg.colorTo: #112233
window.active.button.hover.bg: sunken solid
window.active.button.hover.bg.color: #ffffff
window.active.border.color: #101010
window.active.label.text.color: #fafafa
window.active.button.unpressed.image.color: #eeeeee
window.label.text.justify: center
padding.width: 4
border.width: 2
menu.items.bg: flat solid
menu.items.bg.color: #f0f0f0
menu.items.active.bg: flat solid border
menu.items.active.bg.color: #1e90ff
menu.items.active.bg.border.color: #000080
";

    const WINDOW: Xid = Xid(0x400);

    fn instance() -> RenderInstance<DummyConn> {
        RenderInstance::new(DummyConn::new(), &ThemeConfig::new()).unwrap()
    }

    fn loader_for(dir: &Path) -> ThemeLoader {
        let config = ThemeConfig::builder()
            .search_paths([dir])
            .finish(no_checks)
            .unwrap();
        ThemeLoader::new(config)
    }

    fn install(root: &Path, name: &str, data: &str) -> PathBuf {
        let dir = root.join(name).join("openbox-3");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("themerc"), data).unwrap();
        dir
    }

    fn load_data(inst: &RenderInstance<DummyConn>, data: &str) -> Theme {
        let mut loader = ThemeLoader::new(ThemeConfig::new());
        loader
            .load_from_data(inst, "test", data.as_bytes(), None, &FontOverrides::default())
            .unwrap()
    }

    #[test]
    fn test_missing_theme_falls_back_to_default() {
        let root = TempDir::new().unwrap();
        install(root.path(), "Clearlooks", THEMERC);
        let inst = instance();

        let mut loader = loader_for(root.path());
        let theme = loader
            .load(&inst, Some("Missing"), &FontOverrides::default())
            .unwrap();

        assert_eq!(theme.name(), "Clearlooks");
        assert!(loader.state().is_populated());
        assert_eq!(
            theme.dir(),
            Some(root.path().join("Clearlooks").join("openbox-3").as_path())
        );
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_missing_default_is_an_error() {
        let root = TempDir::new().unwrap();
        let inst = instance();
        let mut loader = loader_for(root.path());

        let res = loader.load(&inst, Some("Missing"), &FontOverrides::default());
        assert!(matches!(res, Err(RenderError::ThemeLoad(_))));
        assert!(loader.state().is_unloaded());

        let res = loader.load(&inst, None, &FontOverrides::default());
        assert!(matches!(res, Err(RenderError::ThemeLoad(_))));
    }

    #[test]
    fn test_close_keeps_theme() {
        let root = TempDir::new().unwrap();
        install(root.path(), "Clearlooks", THEMERC);
        let inst = instance();
        let mut loader = loader_for(root.path());

        let theme = loader.load(&inst, None, &FontOverrides::default()).unwrap();
        loader.close();
        assert!(loader.state().is_closed());
        assert_eq!(theme.dims().padding_x, 4);
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_pressed_falls_back_to_unpressed() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);

        let id = |look| AppearanceId::Button {
            kind: ButtonKind::Close,
            focused: true,
            look,
        };
        {
            let unpressed = theme.appearance(id(ButtonLook::Unpressed)).unwrap();
            let pressed = theme.appearance(id(ButtonLook::Pressed)).unwrap();
            let (a, b) = (&unpressed.surface, &pressed.surface);
            assert_eq!((b.grad, b.relief, b.bevel), (Gradient::Vertical, Relief::Raised, Bevel::Two));
            assert_eq!((a.grad, a.relief, a.bevel), (b.grad, b.relief, b.bevel));
            assert_eq!(a.primary, b.primary);
            assert_eq!(b.secondary.as_ref().unwrap().rgb(), (0x11, 0x22, 0x33));

            // hover is set, so it does not fall back
            let hover = theme.appearance(id(ButtonLook::Hover)).unwrap();
            assert_eq!(hover.surface.relief, Relief::Sunken);

            // disabled has no fallback and gets the default look
            let disabled = theme.appearance(id(ButtonLook::Disabled)).unwrap();
            assert_eq!(disabled.surface.relief, Relief::Flat);
            assert_eq!(disabled.surface.primary.as_ref().unwrap().rgb(), (0, 0, 0));
        }
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_toggled_falls_back_to_pressed() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);

        let toggled = theme
            .appearance(AppearanceId::Button {
                kind: ButtonKind::Max,
                focused: true,
                look: ButtonLook::ToggledHover,
            })
            .unwrap();
        assert_eq!(toggled.surface.grad, Gradient::Vertical);
        drop(toggled);

        // close has no toggled looks at all
        assert!(theme
            .appearance(AppearanceId::Button {
                kind: ButtonKind::Close,
                focused: true,
                look: ButtonLook::Toggled,
            })
            .is_none());
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_button_kind_keys_come_first() {
        let inst = instance();
        let data = format!(
            "{}window.active.button.close.unpressed.bg: flat solid\n\
             window.active.button.close.unpressed.bg.color: #aa0000\n\
             window.active.button.close.unpressed.image.color: #00aa00\n",
            THEMERC
        );
        let theme = load_data(&inst, &data);

        let button = |kind, look| AppearanceId::Button { kind, focused: true, look };
        let image = |kind, look| ColorId::ButtonImage { kind, focused: true, look };
        {
            let close = theme.appearance(button(ButtonKind::Close, ButtonLook::Unpressed)).unwrap();
            assert_eq!(close.surface.relief, Relief::Flat);
            assert_eq!(close.surface.primary.as_ref().unwrap().rgb(), (0xaa, 0, 0));
            let max = theme.appearance(button(ButtonKind::Max, ButtonLook::Unpressed)).unwrap();
            assert_eq!(max.surface.relief, Relief::Raised);
            assert_eq!(max.surface.primary.as_ref().unwrap().rgb(), (0x33, 0x66, 0x99));
        }
        let close = image(ButtonKind::Close, ButtonLook::Unpressed);
        let max = image(ButtonKind::Max, ButtonLook::Unpressed);
        assert_eq!(theme.color(close).unwrap().rgb(), (0, 0xaa, 0));
        assert_eq!(theme.color(max).unwrap().rgb(), (0xee, 0xee, 0xee));
        // unset looks of the overridden kind fall back within that kind
        let pressed = image(ButtonKind::Close, ButtonLook::Pressed);
        assert_eq!(theme.color(pressed).unwrap().rgb(), (0, 0xaa, 0));
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_button_lookup_table() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);

        let state = ButtonState::ENABLED | ButtonState::TOGGLED | ButtonState::HOVERED;
        assert_eq!(
            theme.button(ButtonKind::Close, state),
            AppearanceId::Button {
                kind: ButtonKind::Close,
                focused: false,
                look: ButtonLook::Hover
            }
        );
        // every state maps to an appearance the theme has
        for bits in 0..32u8 {
            let state = ButtonState::from_bits_truncate(bits);
            for kind in ButtonKind::iter() {
                assert!(theme.appearance(theme.button(kind, state)).is_some());
            }
        }
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_colors_inherit() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);

        let active = theme.color(ColorId::FrameBorder { focused: true }).unwrap();
        let inactive = theme.color(ColorId::FrameBorder { focused: false }).unwrap();
        assert_eq!(active.rgb(), (0x10, 0x10, 0x10));
        assert!(Color::ptr_eq(active, inactive));
        assert_eq!(theme.color(ColorId::MenuBorder).unwrap().rgb(), (0x10, 0x10, 0x10));
        assert_eq!(theme.color(ColorId::OsdText).unwrap().rgb(), (0xfa, 0xfa, 0xfa));
        assert_eq!(
            theme.color(ColorId::ClientPadding { focused: true }).unwrap().rgb(),
            (0xff, 0xff, 0xff)
        );

        let pressed = ColorId::ButtonImage {
            kind: ButtonKind::Max,
            focused: true,
            look: ButtonLook::ToggledPressed,
        };
        assert_eq!(theme.color(pressed).unwrap().rgb(), (0xee, 0xee, 0xee));
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_bad_color_falls_through() {
        let inst = instance();
        inst.conn().add_named_color("tomato", (255, 99, 71));
        let theme = load_data(
            &inst,
            "window.active.border.color: #zzz\nborder.color: tomato\nwindow.active.label.text.color: nonsense\n",
        );
        let border = theme.color(ColorId::FrameBorder { focused: true }).unwrap();
        assert_eq!(border.rgb(), (255, 99, 71));
        let text = theme.color(ColorId::LabelText { focused: true }).unwrap();
        assert_eq!(text.rgb(), (0, 0, 0));
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_parent_relative_only_where_allowed() {
        let inst = instance();
        let theme = load_data(
            &inst,
            "window.active.title.bg: parentrelative\nwindow.active.label.bg: parentrelative\n",
        );
        let title = theme.appearance(AppearanceId::Title { focused: true }).unwrap();
        assert_eq!(title.surface.grad, Gradient::Solid);
        let label = theme.appearance(AppearanceId::Label { focused: true }).unwrap();
        assert_eq!(label.surface.grad, Gradient::ParentRelative);
        drop((title, label));

        // the highlighted osd element cannot see through, so it uses the title
        let hilight = theme.appearance(AppearanceId::OsdHilight).unwrap();
        assert_eq!(hilight.surface.grad, Gradient::Solid);
        drop(hilight);
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_dimensions() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);
        let d = *theme.dims();

        assert_eq!((d.padding_x, d.padding_y), (4, 4));
        assert_eq!((d.client_padding_x, d.client_padding_y), (4, 4));
        assert_eq!((d.border_width, d.menu_border_width, d.osd_border_width), (2, 2, 2));
        assert_eq!(d.handle_height, 6);
        // 9 + 3 font, parentrelative labels have no margins
        assert_eq!(d.win_font_height, 12);
        assert_eq!(d.label_height, 12);
        assert_eq!(d.title_height, 20);
        assert_eq!(d.button_size, 10);
        assert_eq!(d.grip_width, 20);
        assert_eq!(d.menu_title_height, 12 + 8);
        assert_eq!(theme.title_justify(), Justify::Center);
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_label_height_rounds_to_even() {
        let inst = instance();
        let theme = load_data(
            &inst,
            "window.active.label.text.font: shadow=y:shadowoffset=1\nwindow.active.label.bg: raised solid\n",
        );
        let d = theme.dims();
        // 13 high font plus a 1px bevel on each side
        assert_eq!(d.win_font_height, 13);
        assert_eq!(d.label_height, 16);
        assert_eq!(d.padding_y, 3);
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_out_of_range_dimensions_ignored() {
        let inst = instance();
        let theme = load_data(
            &inst,
            "padding.width: 500\nmenu.overlap: -5\nmenu.overlap.y: 300\n",
        );
        let d = theme.dims();
        assert_eq!(d.padding_x, 3);
        assert_eq!((d.menu_overlap_x, d.menu_overlap_y), (-5, -5));
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_masks_from_theme_dir() {
        let root = TempDir::new().unwrap();
        let dir = install(root.path(), "Clearlooks", THEMERC);
        fs::write(
            dir.join("max.xbm"),
            "#define max_width 2\n#define max_height 2\nstatic unsigned char max_bits[] = { 0x01, 0x02 };\n",
        )
        .unwrap();
        let inst = instance();
        let mut loader = loader_for(root.path());
        let theme = loader.load(&inst, None, &FontOverrides::default()).unwrap();

        let max = theme.mask(MaskId::Button(ButtonKind::Max, ButtonLook::Unpressed)).unwrap();
        assert_eq!((max.width(), max.height()), (2, 2));
        // pressed copies the file, with its own stencil
        let pressed = theme.mask(MaskId::Button(ButtonKind::Max, ButtonLook::Pressed)).unwrap();
        assert_eq!(pressed.data(), max.data());
        assert_ne!(pressed.stencil(), max.stencil());
        // toggled has no file, so it is built in
        let toggled = theme.mask(MaskId::Button(ButtonKind::Max, ButtonLook::Toggled)).unwrap();
        assert_eq!((toggled.width(), toggled.height()), (6, 6));
        assert_eq!(toggled.data(), defaults::button_bits(ButtonKind::Max, true));

        assert!(theme.mask(MaskId::Button(ButtonKind::Iconify, ButtonLook::Toggled)).is_none());
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_fonts_shared_and_overridden() {
        let inst = instance();
        let own = Font::open(&inst, &FontDescription::new("mono", 10, Default::default(), Default::default())).unwrap();
        let overrides = FontOverrides {
            osd: Some(own.clone()),
            ..FontOverrides::default()
        };
        let mut loader = ThemeLoader::new(ThemeConfig::new());
        let theme = loader
            .load_from_data(&inst, "test", b"menu.items.font: size=10\n", None, &overrides)
            .unwrap();

        let fonts = theme.fonts();
        assert!(Font::ptr_eq(&fonts.active, &fonts.inactive));
        assert!(Font::ptr_eq(&fonts.active, &fonts.menu_title));
        assert!(!Font::ptr_eq(&fonts.active, &fonts.menu_item));
        assert!(Font::ptr_eq(&fonts.osd, &own));
        // the override plus two theme fonts
        assert_eq!(inst.conn().fonts_opened().len(), 3);

        theme.destroy(&inst).unwrap();
        assert_eq!(inst.conn().fonts_closed(), 2);
        own.close(&inst).unwrap();
        assert_eq!(inst.conn().fonts_closed(), 3);
    }

    #[test]
    fn test_paint_label_over_title() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);
        let label = AppearanceId::Label { focused: true };
        let title = AppearanceId::Title { focused: true };

        assert!(theme.set_text(label, "hello"));
        assert!(!theme.set_text(title, "nope"));
        assert!(matches!(
            theme.paint(&inst, label, WINDOW, 40, 12),
            Err(RenderError::ParentNotPainted)
        ));

        theme.paint(&inst, title, Xid(0x401), 40, 20).unwrap();
        theme.paint(&inst, label, WINDOW, 40, 12).unwrap();
        let op = inst.conn().text_ops().pop().unwrap();
        assert_eq!(op.text, "hello");
        theme.destroy(&inst).unwrap();
        assert_eq!(inst.conn().live_pixmaps(), 0);
    }

    #[test]
    fn test_set_parent_moves_child() {
        let inst = instance();
        let mut theme = load_data(&inst, THEMERC);
        let selected = AppearanceId::MenuText(MenuTextKind::Selected);

        assert_eq!(theme.parent(selected), Some(AppearanceId::MenuSelected));
        theme.set_parent(selected, AppearanceId::Menu, 0, 4).unwrap();
        assert_eq!(theme.parent(selected), Some(AppearanceId::Menu));
        assert_eq!(theme.appearance(selected).unwrap().surface.parent_y, 4);
        assert!(theme.set_parent(selected, selected, 0, 0).is_err());

        theme.paint(&inst, AppearanceId::Menu, WINDOW, 30, 30).unwrap();
        theme.paint(&inst, selected, Xid(0x402), 30, 10).unwrap();
        let menu = theme.appearance(AppearanceId::Menu).unwrap().pixels()[4 * 30];
        assert_eq!(theme.appearance(selected).unwrap().pixels()[0], menu);
        theme.destroy(&inst).unwrap();
    }

    #[test]
    fn test_default_icon_shared() {
        let inst = instance();
        let a = load_data(&inst, "");
        let b = load_data(&inst, "");
        assert!(Image::ptr_eq(a.default_icon(), b.default_icon()));
        assert_eq!(inst.image_cache().len(), 1);

        a.destroy(&inst).unwrap();
        b.destroy(&inst).unwrap();
        assert!(inst.image_cache().is_empty());
    }

    #[test]
    fn test_destroy_frees_everything() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);
        assert!(inst.live_colors() > 0);
        assert!(inst.conn().live_pixmaps() > 0);

        theme
            .paint(&inst, AppearanceId::Title { focused: true }, WINDOW, 50, 20)
            .unwrap();
        theme
            .paint(&inst, AppearanceId::MenuSelected, Xid(0x401), 50, 20)
            .unwrap();
        theme.destroy(&inst).unwrap();

        assert_eq!(inst.live_colors(), 0);
        assert_eq!(inst.conn().live_pixmaps(), 0);
        assert_eq!(inst.conn().fonts_closed(), inst.conn().fonts_opened().len());
        assert!(inst.image_cache().is_empty());
    }

    #[test]
    fn test_destroy_keeps_going_after_error() {
        let inst = instance();
        let theme = load_data(&inst, THEMERC);
        theme
            .paint(&inst, AppearanceId::Title { focused: true }, WINDOW, 50, 20)
            .unwrap();

        inst.conn().fail_color_frees(true);
        assert!(theme.destroy(&inst).is_err());

        assert_eq!(inst.live_colors(), 0);
        assert_eq!(inst.conn().live_pixmaps(), 0);
        assert_eq!(inst.conn().fonts_closed(), inst.conn().fonts_opened().len());
        assert!(inst.image_cache().is_empty());
    }

    #[test]
    fn test_failed_font_gives_back_everything() {
        let inst = instance();
        inst.conn().fail_fonts(true);
        let mut loader = ThemeLoader::new(ThemeConfig::new());
        let res = loader.load_from_data(&inst, "test", THEMERC.as_bytes(), None, &FontOverrides::default());

        assert!(matches!(res, Err(RenderError::FontOpen(_))));
        assert!(loader.state().is_unloaded());
        assert_eq!(inst.live_colors(), 0);
        assert_eq!(inst.conn().live_pixmaps(), 0);
    }
}
