//! Overlap handling between the character and map objects.

use crate::collision::Aabb;
use crate::map::{Map, ObjectKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    CoinCollected { coins_left: u32 },
    DialogueStarted(String),
    DialogueEnded,
}

/// First visible object of `kind` overlapping `bounds`.
pub fn object_at(map: &Map, bounds: &Aabb, kind: ObjectKind) -> Option<usize> {
    map.objects.iter().position(|object| {
        !object.hidden && object.kind == kind && object.bounds().intersects(bounds)
    })
}

/// Pick up coins and open dialogue for whatever the character touches.
/// Coins win over dialogue for the frame they are collected in. A block's
/// text is reported once when the character enters it and the dialogue is
/// closed again once no block is touched, whatever else overlaps.
pub fn handle_intersect(map: &mut Map, bounds: &Aabb) -> Option<Interaction> {
    if let Some(index) = object_at(map, bounds, ObjectKind::Coin) {
        map.objects[index].hidden = true;
        map.prev_coins = map.coins_left;
        map.coins_left = map.coins_left.saturating_sub(1);
        log::debug!(
            "Coin {} collected, {} left",
            map.objects[index].object_id,
            map.coins_left
        );
        return Some(Interaction::CoinCollected {
            coins_left: map.coins_left,
        });
    }

    match object_at(map, bounds, ObjectKind::Block) {
        Some(index) if map.dialogue_block == Some(index) => None,
        Some(index) => {
            map.dialogue_block = Some(index);
            map.objects[index]
                .text
                .clone()
                .map(Interaction::DialogueStarted)
        }
        None => map
            .dialogue_block
            .take()
            .map(|_| Interaction::DialogueEnded),
    }
}

/// True when the character stands in front of a door that has opened.
pub fn at_open_door(map: &Map, bounds: &Aabb) -> bool {
    map.doors_open() && object_at(map, bounds, ObjectKind::Door).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tests::sample_map;

    fn box_at(x: f32, y: f32) -> Aabb {
        Aabb {
            center_x: x,
            center_y: y,
            half_w: 16.0,
            half_h: 16.0,
        }
    }

    #[test]
    fn coin_counts_only_once() {
        let mut map = sample_map();
        let at_coin = box_at(72.0, 104.0);

        assert_eq!(
            handle_intersect(&mut map, &at_coin),
            Some(Interaction::CoinCollected { coins_left: 1 })
        );
        assert_eq!(map.prev_coins, 2);
        assert!(map.objects[1].hidden);

        handle_intersect(&mut map, &at_coin);
        handle_intersect(&mut map, &at_coin);
        assert_eq!(map.coins_left, 1);
    }

    #[test]
    fn coins_left_never_underflows() {
        let mut map = sample_map();
        map.coins_left = 0;
        handle_intersect(&mut map, &box_at(72.0, 104.0));
        assert_eq!(map.coins_left, 0);
    }

    #[test]
    fn dialogue_once_per_episode() {
        let mut map = sample_map();
        let on_block = box_at(104.0, 104.0);
        let away = box_at(136.0, 40.0);

        assert_eq!(
            handle_intersect(&mut map, &on_block),
            Some(Interaction::DialogueStarted("Hop on!".to_string()))
        );
        assert_eq!(handle_intersect(&mut map, &on_block), None);
        assert_eq!(
            handle_intersect(&mut map, &away),
            Some(Interaction::DialogueEnded)
        );
        assert_eq!(handle_intersect(&mut map, &away), None);
        assert!(matches!(
            handle_intersect(&mut map, &on_block),
            Some(Interaction::DialogueStarted(_))
        ));
    }

    #[test]
    fn door_opens_after_all_coins() {
        let mut map = sample_map();
        let at_door = box_at(24.0, 104.0);
        assert!(!at_open_door(&map, &at_door));
        map.coins_left = 0;
        assert!(at_open_door(&map, &at_door));
        assert!(!at_open_door(&map, &box_at(136.0, 40.0)));
    }

    #[test]
    fn dialogue_closes_when_moving_onto_a_door() {
        let mut map = sample_map();
        map.objects[3].x = 80;
        let door_and_block = box_at(88.0, 104.0);
        let door_only = box_at(72.0, 104.0);
        map.objects[1].hidden = true;

        assert_eq!(
            handle_intersect(&mut map, &door_and_block),
            Some(Interaction::DialogueStarted("Hop on!".to_string()))
        );
        assert_eq!(handle_intersect(&mut map, &door_and_block), None);
        map.objects[4].x = 120;
        assert_eq!(
            handle_intersect(&mut map, &door_only),
            Some(Interaction::DialogueEnded)
        );
        assert_eq!(map.dialogue_block, None);
    }

    #[test]
    fn coin_beside_block_is_collected_first() {
        let mut map = sample_map();
        let between = box_at(80.0, 104.0);
        assert_eq!(
            handle_intersect(&mut map, &between),
            Some(Interaction::CoinCollected { coins_left: 1 })
        );
        assert_eq!(
            handle_intersect(&mut map, &between),
            Some(Interaction::DialogueStarted("Hop on!".to_string()))
        );
    }
}
