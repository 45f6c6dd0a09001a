use eframe::egui::{RichText, Ui};

use crate::family::Relation;
use crate::util::format_lifespan;

use super::super::ViewModel;

const NEIGHBORHOOD_RADIUS: f32 = 600.0;
const NEIGHBORHOOD_LIMIT: usize = 16;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Person");
        ui.add_space(4.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a person in the tree or from search.");
            return;
        };

        let Some(person) = self.graph.persons.get(&selected_id).cloned() else {
            ui.label("Selected person no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(&person.name).strong());
        ui.small(person.id.as_str());
        let lifespan = format_lifespan(person.birth_year);
        if !lifespan.is_empty() {
            ui.label(lifespan);
        }
        ui.add_space(4.0);

        self.draw_relation_list(ui, "Parents", &person.parents);
        self.draw_relation_list(ui, "Spouses", &person.spouses);
        self.draw_relation_list(ui, "Children", &person.children);
        self.draw_relation_list(ui, "Siblings", &person.siblings);

        ui.separator();
        ui.label(RichText::new("Nearby in the tree").strong());
        self.draw_neighborhood(ui, &selected_id);

        ui.separator();
        ui.label(RichText::new("Descent from root").strong());
        if let Some(path) = self.graph.path_from_root(&selected_id) {
            let names = path
                .iter()
                .filter_map(|id| self.graph.persons.get(id))
                .map(|person| person.name.clone())
                .collect::<Vec<_>>();
            ui.label(names.join(" -> "));
        } else {
            ui.label("Not a descendant of the current root.");
        }
    }

    fn draw_relation_list(&mut self, ui: &mut Ui, title: &str, relations: &[Relation]) {
        if relations.is_empty() {
            return;
        }

        ui.label(RichText::new(title).strong());
        for relation in relations {
            let Some(related) = self.graph.persons.get(&relation.id) else {
                continue;
            };

            let label = format!("{}  [{}]", related.name, relation.kind.label());
            if ui.link(label).on_hover_text(relation.id.as_str()).clicked() {
                self.set_selected(Some(relation.id.clone()));
            }
        }
        ui.add_space(2.0);
    }

    // Spatial neighborhood, not a relationship query: whoever the layout put
    // within NEIGHBORHOOD_RADIUS scaled units of the selected person.
    fn draw_neighborhood(&mut self, ui: &mut Ui, selected_id: &str) {
        let (Some(layout), Some(virtualizer)) = (self.layout.clone(), self.virtualizer.as_ref())
        else {
            ui.small("layout not ready");
            return;
        };

        let mut neighbors = virtualizer
            .nodes_in_radius(selected_id, NEIGHBORHOOD_RADIUS)
            .into_iter()
            .filter_map(|index| layout.nodes.get(index))
            .filter(|node| node.id != selected_id)
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();
        neighbors.sort_unstable();
        neighbors.truncate(NEIGHBORHOOD_LIMIT);

        if neighbors.is_empty() {
            ui.small("nobody nearby at this scale");
            return;
        }

        let mut clicked = None;
        for id in &neighbors {
            let Some(person) = self.graph.persons.get(id) else {
                continue;
            };
            if ui.link(&person.name).on_hover_text(id.as_str()).clicked() {
                clicked = Some(id.clone());
            }
        }
        if clicked.is_some() {
            self.set_selected(clicked);
        }
    }
}
