use iced::widget::image::Handle;
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, scrollable, stack, text, Column,
};
use iced::{Color, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use super::view_model::{CardView, DetailModal, RosterView};
use crate::roster::filter::{FilterOutcome, DETAILS_BUTTON_LABEL};
use crate::Message;

const CARD_WIDTH: f32 = 240.0;
const PHOTO_HEIGHT: f32 = 150.0;

/// Every visible group section with its wrapped card grid
pub fn roster_grid<'a>(
    view: &'a RosterView,
    outcome: &FilterOutcome,
    thumbnails: &'a HashMap<String, Handle>,
) -> Element<'a, Message> {
    let mut sections = Column::new().spacing(28);

    for (g, section) in view.sections.iter().enumerate() {
        // Sections whose cards are all filtered out disappear with their heading
        if !outcome.is_group_visible(g) {
            continue;
        }

        let cards: Vec<Element<'a, Message>> = section
            .cards
            .iter()
            .enumerate()
            .filter(|(c, _)| outcome.is_entry_visible(g, *c))
            .map(|(_, card)| card_view(card, thumbnails.get(&card.id)))
            .collect();

        sections = sections.push(
            column![
                text(&section.name).size(26),
                Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0),
            ]
            .spacing(12),
        );
    }

    scrollable(sections.padding(8)).height(Length::Fill).into()
}

fn card_view<'a>(card: &'a CardView, thumbnail: Option<&Handle>) -> Element<'a, Message> {
    let photo: Element<'a, Message> = match thumbnail {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PHOTO_HEIGHT))
            .into(),
        None => container(text("📷 Add photo").size(14))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(PHOTO_HEIGHT))
            .into(),
    };

    let content = column![
        button(photo)
            .on_press(Message::Card(card.photo_action()))
            .padding(0)
            .style(button::text),
        text(&card.id).size(20),
        text(&card.subtitle).size(14),
        button(DETAILS_BUTTON_LABEL)
            .on_press(Message::Card(card.details_action()))
            .padding(8),
    ]
    .spacing(8);

    container(content)
        .padding(12)
        .width(Length::Fixed(CARD_WIDTH))
        .style(container::rounded_box)
        .into()
}

/// Detail panel for one locomotive
pub fn details_panel(modal: &DetailModal) -> Element<'_, Message> {
    let body: Column<'_, Message> = match modal {
        DetailModal::Loaded(detail) => {
            let functions = detail
                .function_lines()
                .into_iter()
                .fold(Column::new().spacing(4), |list, line| list.push(text(line).size(14)));

            column![
                text(&detail.id).size(28),
                text(detail.headline()).size(16),
                text(format!("DCC Address: {}", detail.dcc_address)),
                text(format!("Decoder: {}", detail.decoder_label)),
                text("Function Map").size(20),
                scrollable(functions).height(Length::Fixed(260.0)),
            ]
            .spacing(10)
        }
        DetailModal::NotFound(message) => column![text(message).size(16)],
    };

    container(
        body.push(button("Close").on_press(Message::CloseDetails))
            .spacing(12),
    )
    .width(Length::Fixed(440.0))
    .padding(20)
    .style(container::rounded_box)
    .into()
}

/// Overlay `content` on a dimmed `base`; clicking the backdrop sends `on_blur`
pub fn modal<'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base,
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| container::Style {
                background: Some(
                    Color {
                        a: 0.8,
                        ..Color::BLACK
                    }
                    .into(),
                ),
                ..container::Style::default()
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}
