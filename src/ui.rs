use crate::accounts::{AccountRegistry, DEMO_PASSWORD, DEMO_USERNAME};
use crate::config::AppConfig;
use crate::defaults;
use crate::display::{self, currency, percent, Status};
use crate::images::{self, ImageLookup};
use crate::model::{validate_draft, Item, ItemEdit, CATEGORIES};
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::store::now_millis;
use eframe::egui;
use egui::{Color32, Context, FontFamily, FontId, Margin, RichText, Stroke, Visuals};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::warn;

const THEME_KEY: &str = "theme";

const ACCENT: Color32 = Color32::from_rgb(52, 120, 246);
const PROFIT: Color32 = Color32::from_rgb(30, 160, 90);
const LOSS: Color32 = Color32::from_rgb(220, 70, 70);
const NEUTRAL: Color32 = Color32::from_rgb(140, 140, 140);

pub fn set_custom_style(ctx: &Context, dark: bool) {
    let mut visuals = if dark { Visuals::dark() } else { Visuals::light() };

    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.5, ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);

    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Heading,
        FontId::new(21.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        FontId::new(15.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

fn profit_color(profit: f64) -> Color32 {
    match Status::of(profit) {
        Status::Profit => PROFIT,
        Status::Loss => LOSS,
        Status::BreakEven => NEUTRAL,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum View {
    Dashboard,
    Inventory,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortBy {
    Added,
    Name,
    Category,
    Buy,
    Market,
    Profit,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

struct Notice {
    text: String,
    error: bool,
}

impl Notice {
    fn ok(text: impl Into<String>) -> Self {
        Notice { text: text.into(), error: false }
    }

    fn error(text: impl Into<String>) -> Self {
        Notice { text: text.into(), error: true }
    }
}

#[derive(Default)]
struct AuthForm {
    username: String,
    email: String,
    password: String,
}

#[derive(Clone)]
struct ItemForm {
    name: String,
    category: String,
    buying: String,
    market: String,
    image_url: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        ItemForm {
            name: String::new(),
            category: CATEGORIES[0].to_string(),
            buying: String::new(),
            market: String::new(),
            image_url: String::new(),
        }
    }
}

impl ItemForm {
    fn from_item(item: &Item) -> Self {
        ItemForm {
            name: item.name.clone(),
            category: item.category.clone(),
            buying: item.buying_price.to_string(),
            market: item.market_price.to_string(),
            image_url: item.image_url.clone(),
        }
    }
}

enum RowAction {
    Edit(u64),
    Delete(u64),
}

pub struct TrackerApp {
    storage: Rc<dyn KeyValueStore>,
    accounts: AccountRegistry,
    images: Box<dyn ImageLookup>,
    config: AppConfig,
    session: Option<Session>,

    view: View,
    dark: bool,
    notice: Option<Notice>,

    auth_mode: AuthMode,
    auth: AuthForm,

    add_form: ItemForm,
    editing: Option<(u64, ItemForm)>,
    edit_error: Option<String>,
    confirm_clear: bool,

    // Inventory table
    search: String,
    sort_by: SortBy,
    sort_order: SortOrder,

    // Market range filter
    filter_min: String,
    filter_max: String,
    applied_range: Option<(f64, f64)>,
}

impl TrackerApp {
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        accounts: AccountRegistry,
        images: Box<dyn ImageLookup>,
        config: AppConfig,
    ) -> Self {
        let dark = match storage.read(THEME_KEY) {
            Ok(Some(theme)) => theme == "dark",
            _ => config.dark_theme,
        };

        let mut app = Self {
            storage,
            accounts,
            images,
            config,
            session: None,

            view: View::Dashboard,
            dark,
            notice: None,

            auth_mode: AuthMode::Login,
            auth: AuthForm::default(),

            add_form: ItemForm::default(),
            editing: None,
            edit_error: None,
            confirm_clear: false,

            search: String::new(),
            sort_by: SortBy::Added,
            sort_order: SortOrder::Descending,

            filter_min: String::new(),
            filter_max: String::new(),
            applied_range: None,
        };

        match app.accounts.current_user() {
            Ok(Some(username)) => app.open_session(&username),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not restore signed-in user"),
        }
        app
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    fn open_session(&mut self, username: &str) {
        let is_demo = self
            .accounts
            .users()
            .map(|users| users.get(username).map(|u| u.is_demo).unwrap_or(false))
            .unwrap_or(false);
        self.session = Some(Session::open(
            self.storage.clone(),
            username,
            is_demo,
            self.config.recent_capacity,
        ));
        self.view = View::Dashboard;
        self.notice = None;
    }

    fn submit_auth(&mut self) {
        let username = self.auth.username.trim().to_string();
        let result = match self.auth_mode {
            AuthMode::Login => self.accounts.login(&username, &self.auth.password),
            AuthMode::Register => self
                .accounts
                .register(&username, &self.auth.email, &self.auth.password)
                .and_then(|_| self.accounts.set_current_user(&username)),
        };
        match result {
            Ok(()) => {
                self.auth = AuthForm::default();
                self.open_session(&username);
            }
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }

    fn logout(&mut self) {
        if let Err(e) = self.accounts.logout() {
            warn!(error = %e, "could not clear signed-in user");
        }
        self.session = None;
        self.editing = None;
        self.applied_range = None;
        self.add_form = ItemForm::default();
        self.notice = None;
    }

    fn toggle_theme(&mut self, ctx: &Context) {
        self.dark = !self.dark;
        set_custom_style(ctx, self.dark);
        let theme = if self.dark { "dark" } else { "light" };
        if let Err(e) = self.storage.write(THEME_KEY, theme) {
            warn!(error = %e, "could not save theme");
        }
    }

    fn auth_screen(&mut self, ctx: &Context) {
        let mut submitted = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.label(RichText::new("📦").size(56.0));
                ui.heading(RichText::new("Smart Resell Tracker").size(28.0).strong().color(ACCENT));
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    ui.add_space((ui.available_width() - 180.0).max(0.0) / 2.0);
                    ui.selectable_value(&mut self.auth_mode, AuthMode::Login, "Login");
                    ui.selectable_value(&mut self.auth_mode, AuthMode::Register, "Register");
                });
                ui.add_space(8.0);

                ui.add(egui::TextEdit::singleline(&mut self.auth.username).hint_text("Username").desired_width(260.0));
                if self.auth_mode == AuthMode::Register {
                    ui.add(egui::TextEdit::singleline(&mut self.auth.email).hint_text("Email").desired_width(260.0));
                }
                let password = ui.add(
                    egui::TextEdit::singleline(&mut self.auth.password)
                        .password(true)
                        .hint_text("Password")
                        .desired_width(260.0),
                );
                let entered = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(8.0);
                let label = match self.auth_mode {
                    AuthMode::Login => "Sign in",
                    AuthMode::Register => "Create account",
                };
                if ui.add_sized([260.0, 32.0], egui::Button::new(RichText::new(label).strong())).clicked() || entered {
                    submitted = true;
                }

                if let Some(notice) = &self.notice {
                    ui.add_space(6.0);
                    ui.colored_label(if notice.error { LOSS } else { PROFIT }, &notice.text);
                }

                if self.config.seed_demo_account {
                    ui.add_space(20.0);
                    ui.label(
                        RichText::new(format!("Demo account: {DEMO_USERNAME} / {DEMO_PASSWORD}"))
                            .small()
                            .color(NEUTRAL),
                    );
                }
            });
        });

        if submitted {
            self.submit_auth();
        }
    }

    fn top_bar(&mut self, ctx: &Context) {
        let mut logout = false;
        let mut toggle = false;
        let username = self.session.as_ref().map(|s| s.username.clone()).unwrap_or_default();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("📦 Smart Resell Tracker").strong().color(ACCENT));
                ui.separator();
                ui.selectable_value(&mut self.view, View::Dashboard, "📊 Dashboard");
                ui.selectable_value(&mut self.view, View::Inventory, "🗃 Inventory");
                ui.selectable_value(&mut self.view, View::Filter, "🔎 Filter");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        logout = true;
                    }
                    if ui.button(if self.dark { "☀ Light" } else { "🌙 Dark" }).clicked() {
                        toggle = true;
                    }
                    ui.label(RichText::new(format!("👤 {username}")).strong());
                });
            });
            if let Some(notice) = &self.notice {
                ui.colored_label(if notice.error { LOSS } else { PROFIT }, &notice.text);
            }
            ui.add_space(4.0);
        });

        if toggle {
            self.toggle_theme(ctx);
        }
        if logout {
            self.logout();
        }
    }

    fn dashboard(&mut self, ui: &mut egui::Ui) {
        let top_count = self.config.top_count;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let store = &session.store;
        let stats = store.stats();
        let now = now_millis();
        let mut sell = None;

        ui.horizontal_wrapped(|ui| {
            stat_card(ui, "Total items", stats.total_items.to_string(), ACCENT);
            stat_card(ui, "Total profit", currency(stats.total_profit), profit_color(stats.total_profit));
            stat_card(ui, "Investment", currency(stats.total_investment), NEUTRAL);
            stat_card(ui, "Market value", currency(stats.total_market_value), NEUTRAL);
            stat_card(ui, "Profitable", stats.profitable_items.to_string(), PROFIT);
            stat_card(ui, "At a loss", stats.loss_items.to_string(), LOSS);
            stat_card(ui, "Avg profit %", percent(stats.avg_profit_percent), profit_color(stats.avg_profit_percent));
        });

        ui.add_space(10.0);
        ui.columns(2, |cols| {
            cols[0].heading("🏆 Best item");
            match store.best_item() {
                Some(best) => {
                    let ui = &mut cols[0];
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(images::category_icon(&best.category)).size(32.0));
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&best.name).strong().size(17.0))
                                .on_hover_text(images::display_url(&best.name, &best.category, &best.image_url));
                            ui.label(format!(
                                "{} · buy {} · market {}",
                                best.category,
                                currency(best.buying_price),
                                currency(best.market_price)
                            ));
                            ui.colored_label(
                                profit_color(best.profit),
                                format!("{} ({})", currency(best.profit), percent(best.profit_percent)),
                            );
                        });
                    });
                    if ui.button("💰 Mark as sold").clicked() {
                        sell = Some(best);
                    }
                }
                None => {
                    cols[0].label(RichText::new("Add items to see your best pick.").color(NEUTRAL));
                }
            }

            cols[1].heading("🕒 Recently added");
            let recent = store.recent_items();
            if recent.is_empty() {
                cols[1].label(RichText::new("Nothing added yet.").color(NEUTRAL));
            }
            for item in recent {
                cols[1].horizontal(|ui| {
                    ui.label(images::category_icon(&item.category));
                    ui.label(RichText::new(&item.name).strong());
                    ui.colored_label(profit_color(item.profit), currency(item.profit));
                    ui.label(RichText::new(display::time_ago(item.created_at, now)).small().color(NEUTRAL));
                });
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.columns(2, |cols| {
            let top = store.top_items(top_count);
            cols[0].heading(format!("📈 Top {top_count} by profit %"));
            for (rank, item) in top.iter().enumerate() {
                cols[0].horizontal(|ui| {
                    ui.label(RichText::new(format!("#{}", rank + 1)).strong());
                    ui.label(&item.name);
                    ui.colored_label(profit_color(item.profit), percent(item.profit_percent));
                });
            }
            profit_chart(&mut cols[0], &top);

            let categories = store.ranked_categories();
            cols[1].heading("🗂 Categories");
            egui::Grid::new("category_breakdown")
                .num_columns(3)
                .striped(true)
                .show(&mut cols[1], |ui| {
                    ui.label(RichText::new("Category").strong());
                    ui.label(RichText::new("Items").strong());
                    ui.label(RichText::new("Total profit").strong());
                    ui.end_row();
                    for (category, totals) in &categories {
                        ui.label(format!("{} {}", images::category_icon(category), category));
                        ui.label(totals.count.to_string());
                        ui.colored_label(profit_color(totals.total_profit), currency(totals.total_profit));
                        ui.end_row();
                    }
                });
            category_chart(&mut cols[1], &categories);
        });

        if let Some(item) = sell {
            session.store.remove_item(item.id);
            self.notice = Some(Notice::ok(format!(
                "Sold {} for {} ({} profit)",
                item.name,
                currency(item.market_price),
                currency(item.profit)
            )));
        }
    }

    fn add_item_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("➕ Add item");
        item_form_ui(ui, &mut self.add_form, "add_item");

        if ui.button(RichText::new("Add item").strong()).clicked() {
            let form = &self.add_form;
            match validate_draft(&form.name, &form.category, &form.buying, &form.market) {
                Ok(draft) => {
                    let image = match form.image_url.trim() {
                        "" => self.images.lookup(&draft.name, &draft.category),
                        url => url.to_string(),
                    };
                    if let Some(session) = self.session.as_mut() {
                        let item = session.store.add_item(draft.with_image(image));
                        self.notice = Some(Notice::ok(format!("Added {}", item.name)));
                        self.add_form = ItemForm::default();
                    }
                }
                Err(e) => self.notice = Some(Notice::error(e.to_string())),
            }
        }
    }

    fn inventory(&mut self, ui: &mut egui::Ui) {
        self.add_item_form(ui);
        ui.add_space(8.0);
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("🔎");
            ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("Search name or category...").desired_width(220.0));
            ui.separator();

            if ui.button("⟲ Restore sample products").clicked() {
                if let Some(session) = self.session.as_mut() {
                    let added = defaults::ensure_defaults(&mut session.store);
                    self.notice = Some(Notice::ok(match added {
                        0 => "All sample products are already listed".to_string(),
                        n => format!("Added {n} sample product(s)"),
                    }));
                }
            }

            if self.confirm_clear {
                ui.label(RichText::new("Delete every item?").color(LOSS));
                if ui.button("Yes, clear all").clicked() {
                    if let Some(session) = self.session.as_mut() {
                        session.store.clear_all();
                    }
                    self.confirm_clear = false;
                    self.notice = Some(Notice::ok("Inventory cleared"));
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_clear = false;
                }
            } else if ui.button(RichText::new("🗑 Clear all").color(LOSS)).clicked() {
                self.confirm_clear = true;
            }
        });

        let rows = match &self.session {
            Some(session) => {
                let mut rows = search_items(session.store.all_items(), &self.search);
                sort_items(&mut rows, self.sort_by, self.sort_order);
                rows
            }
            None => Vec::new(),
        };

        if rows.is_empty() {
            ui.add_space(20.0);
            ui.label(RichText::new("No items to show").color(NEUTRAL));
            return;
        }

        let now = now_millis();
        let mut clicked_sort = None;
        let mut actions = Vec::new();

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(34.0))
            .column(Column::remainder().at_least(160.0).clip(true))
            .column(Column::exact(110.0))
            .column(Column::exact(110.0))
            .column(Column::exact(110.0))
            .column(Column::exact(110.0))
            .column(Column::exact(90.0))
            .column(Column::exact(100.0))
            .column(Column::exact(90.0))
            .column(Column::exact(90.0))
            .header(30.0, |mut header| {
                header.col(|_| {});
                let columns = [
                    ("Item", SortBy::Name),
                    ("Category", SortBy::Category),
                    ("Buy", SortBy::Buy),
                    ("Market", SortBy::Market),
                    ("Profit", SortBy::Profit),
                    ("Profit %", SortBy::Percent),
                ];
                for (label, by) in columns {
                    header.col(|ui| sort_header(ui, label, by, self.sort_by, self.sort_order, &mut clicked_sort));
                }
                header.col(|ui| {
                    ui.strong("Status");
                });
                header.col(|ui| sort_header(ui, "Added", SortBy::Added, self.sort_by, self.sort_order, &mut clicked_sort));
                header.col(|ui| {
                    ui.strong("Actions");
                });
            })
            .body(|body| {
                body.rows(32.0, rows.len(), |mut row| {
                    let item = &rows[row.index()];
                    let color = profit_color(item.profit);

                    row.col(|ui| {
                        ui.label(RichText::new(images::category_icon(&item.category)).size(18.0));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(&item.name).strong())
                            .on_hover_text(images::display_url(&item.name, &item.category, &item.image_url));
                    });
                    row.col(|ui| {
                        ui.label(&item.category);
                    });
                    row.col(|ui| {
                        ui.label(currency(item.buying_price));
                    });
                    row.col(|ui| {
                        ui.label(currency(item.market_price));
                    });
                    row.col(|ui| {
                        ui.colored_label(color, currency(item.profit));
                    });
                    row.col(|ui| {
                        ui.colored_label(color, percent(item.profit_percent));
                    });
                    row.col(|ui| {
                        ui.colored_label(color, display::status(item).label());
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(display::time_ago(item.created_at, now)).small());
                    });
                    row.col(|ui| {
                        if ui.small_button("✏").on_hover_text("Edit").clicked() {
                            actions.push(RowAction::Edit(item.id));
                        }
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            actions.push(RowAction::Delete(item.id));
                        }
                    });
                });
            });

        if let Some(by) = clicked_sort {
            if self.sort_by == by {
                self.sort_order = match self.sort_order {
                    SortOrder::Ascending => SortOrder::Descending,
                    SortOrder::Descending => SortOrder::Ascending,
                };
            } else {
                self.sort_by = by;
                self.sort_order = SortOrder::Descending;
            }
        }

        for action in actions {
            match action {
                RowAction::Edit(id) => {
                    if let Some(item) = self.session.as_ref().and_then(|s| s.store.get(id)) {
                        self.editing = Some((id, ItemForm::from_item(item)));
                        self.edit_error = None;
                    }
                }
                RowAction::Delete(id) => {
                    let removed = self.session.as_mut().and_then(|s| s.store.remove_item(id));
                    if let Some(item) = removed {
                        self.notice = Some(Notice::ok(format!("Deleted {}", item.name)));
                    }
                }
            }
        }
    }

    fn edit_window(&mut self, ctx: &Context) {
        let Some((id, mut form)) = self.editing.take() else {
            return;
        };
        let mut open = true;
        let mut save = false;
        let mut cancel = false;

        egui::Window::new("✏ Edit item")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                item_form_ui(ui, &mut form, "edit_item");
                if let Some(error) = &self.edit_error {
                    ui.colored_label(LOSS, error);
                }
                ui.horizontal(|ui| {
                    if ui.button(RichText::new("Save").strong()).clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            match validate_draft(&form.name, &form.category, &form.buying, &form.market) {
                Ok(draft) => {
                    let image_url = match form.image_url.trim() {
                        "" => self.images.lookup(&draft.name, &draft.category),
                        url => url.to_string(),
                    };
                    let edit = ItemEdit {
                        name: Some(draft.name),
                        category: Some(draft.category),
                        buying_price: Some(draft.buying_price),
                        market_price: Some(draft.market_price),
                        image_url: Some(image_url),
                    };
                    let updated = self.session.as_mut().and_then(|s| s.store.edit_item(id, edit));
                    self.notice = Some(match updated {
                        Some(item) => Notice::ok(format!("Updated {}", item.name)),
                        None => Notice::error("That item no longer exists"),
                    });
                    self.edit_error = None;
                    return;
                }
                Err(e) => self.edit_error = Some(e.to_string()),
            }
        }

        if open && !cancel {
            self.editing = Some((id, form));
        } else {
            self.edit_error = None;
        }
    }

    fn filter(&mut self, ui: &mut egui::Ui) {
        ui.heading("🔎 Filter by market price");
        ui.horizontal(|ui| {
            ui.label("Min");
            ui.add(egui::TextEdit::singleline(&mut self.filter_min).hint_text("0").desired_width(100.0));
            ui.label("Max");
            ui.add(egui::TextEdit::singleline(&mut self.filter_max).hint_text("no limit").desired_width(100.0));

            if ui.button("Apply filter").clicked() {
                match parse_range(&self.filter_min, &self.filter_max) {
                    Ok(range) => {
                        self.applied_range = Some(range);
                        self.notice = None;
                    }
                    Err(msg) => self.notice = Some(Notice::error(msg)),
                }
            }
            if ui.button("Clear").clicked() {
                self.filter_min.clear();
                self.filter_max.clear();
                self.applied_range = None;
            }
        });
        ui.add_space(8.0);

        let (Some((min, max)), Some(session)) = (self.applied_range, self.session.as_ref()) else {
            ui.label(RichText::new("Enter a range and click Apply filter.").color(NEUTRAL));
            return;
        };

        let results = session.store.filter_by_market_range(min, max);
        let upper = if max.is_finite() { currency(max) } else { "∞".to_string() };
        ui.label(format!("{} item(s) between {} and {}", results.len(), currency(min), upper));
        ui.add_space(4.0);

        egui::Grid::new("filter_results")
            .num_columns(5)
            .striped(true)
            .show(ui, |ui| {
                ui.strong("Item");
                ui.strong("Category");
                ui.strong("Market");
                ui.strong("Profit");
                ui.strong("Profit %");
                ui.end_row();
                for item in &results {
                    ui.label(format!("{} {}", images::category_icon(&item.category), item.name));
                    ui.label(&item.category);
                    ui.label(currency(item.market_price));
                    ui.colored_label(profit_color(item.profit), currency(item.profit));
                    ui.colored_label(profit_color(item.profit), percent(item.profit_percent));
                    ui.end_row();
                }
            });
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if self.session.is_none() {
            self.auth_screen(ctx);
            return;
        }

        self.top_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.view {
                View::Dashboard => self.dashboard(ui),
                View::Inventory => self.inventory(ui),
                View::Filter => self.filter(ui),
            });
        });

        self.edit_window(ctx);
    }
}

fn item_form_ui(ui: &mut egui::Ui, form: &mut ItemForm, id: &str) {
    egui::Grid::new(id).num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
        ui.label("Name");
        ui.add(egui::TextEdit::singleline(&mut form.name).hint_text("e.g. Office Chair").desired_width(240.0));
        ui.end_row();

        ui.label("Category");
        egui::ComboBox::from_id_salt(format!("{id}_category"))
            .selected_text(form.category.clone())
            .show_ui(ui, |ui| {
                for category in CATEGORIES {
                    ui.selectable_value(&mut form.category, category.to_string(), category);
                }
            });
        ui.end_row();

        ui.label("Buying price");
        ui.add(egui::TextEdit::singleline(&mut form.buying).hint_text("0.00").desired_width(120.0));
        ui.end_row();

        ui.label("Market price");
        ui.add(egui::TextEdit::singleline(&mut form.market).hint_text("0.00").desired_width(120.0));
        ui.end_row();

        ui.label("Image URL");
        ui.add(egui::TextEdit::singleline(&mut form.image_url).hint_text("optional").desired_width(240.0));
        ui.end_row();
    });

    if let Some(p) = display::preview(&form.buying, &form.market) {
        let color = if p.worth_buying { PROFIT } else { LOSS };
        ui.horizontal(|ui| {
            ui.colored_label(color, format!("Profit {}", currency(p.profit)));
            ui.colored_label(color, percent(p.profit_percent));
            ui.colored_label(color, if p.worth_buying { "Worth buying ✅" } else { "Not worth buying ❌" });
        });
    }
}

fn stat_card(ui: &mut egui::Ui, title: &str, value: String, color: Color32) {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .stroke(Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
        .inner_margin(Margin::same(10))
        .show(ui, |ui| {
            ui.set_min_width(140.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(title).small().color(NEUTRAL));
                ui.label(RichText::new(value).size(19.0).strong().color(color));
            });
        });
}

fn sort_header(
    ui: &mut egui::Ui,
    label: &str,
    by: SortBy,
    current: SortBy,
    order: SortOrder,
    clicked: &mut Option<SortBy>,
) {
    let arrow = match (current == by, order) {
        (true, SortOrder::Ascending) => " ⬆",
        (true, SortOrder::Descending) => " ⬇",
        (false, _) => "",
    };
    if ui.button(RichText::new(format!("{label}{arrow}")).strong()).clicked() {
        *clicked = Some(by);
    }
}

fn profit_chart(ui: &mut egui::Ui, items: &[Item]) {
    let bars: Vec<Bar> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Bar::new(i as f64, item.profit_percent)
                .name(&item.name)
                .fill(profit_color(item.profit))
        })
        .collect();
    Plot::new("top_profit_chart")
        .height(180.0)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new("Profit %", bars)));
}

fn category_chart(ui: &mut egui::Ui, categories: &[(String, crate::model::CategoryTotals)]) {
    let bars: Vec<Bar> = categories
        .iter()
        .enumerate()
        .map(|(i, (category, totals))| {
            Bar::new(i as f64, totals.total_profit)
                .name(category)
                .fill(profit_color(totals.total_profit))
        })
        .collect();
    Plot::new("category_profit_chart")
        .height(180.0)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new("Total profit", bars)));
}

pub fn search_items(items: Vec<Item>, query: &str) -> Vec<Item> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|i| i.name.to_lowercase().contains(&query) || i.category.to_lowercase().contains(&query))
        .collect()
}

pub fn sort_items(items: &mut [Item], by: SortBy, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = match by {
            SortBy::Added => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::Category => a.category.cmp(&b.category),
            SortBy::Buy => a.buying_price.total_cmp(&b.buying_price),
            SortBy::Market => a.market_price.total_cmp(&b.market_price),
            SortBy::Profit => a.profit.total_cmp(&b.profit),
            SortBy::Percent => a.profit_percent.total_cmp(&b.profit_percent),
        };
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}

/// Blank min means 0, blank max means no upper limit.
pub fn parse_range(min: &str, max: &str) -> Result<(f64, f64), String> {
    let parse = |text: &str, default: f64, label: &str| -> Result<f64, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(default);
        }
        match text.parse::<f64>() {
            Ok(v) if v >= 0.0 && !v.is_nan() => Ok(v),
            _ => Err(format!("{label} price must be a non-negative number")),
        }
    };
    let min = parse(min, 0.0, "Minimum")?;
    let max = parse(max, f64::INFINITY, "Maximum")?;
    match min.partial_cmp(&max) {
        Some(Ordering::Greater) => Err("Minimum price cannot be greater than maximum".to_string()),
        _ => Ok((min, max)),
    }
}
